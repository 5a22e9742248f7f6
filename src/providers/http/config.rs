use std::time::Duration;

/// Default timeout applied to every provider request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing where puzzles and genres are fetched from.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub puzzle_base_url: String,
    pub genre_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub timeout: Duration,
}

impl HttpProviderConfig {
    /// Construct a configuration from explicit endpoints.
    pub fn new(puzzle_base_url: impl Into<String>, genre_url: impl Into<String>) -> Self {
        Self {
            puzzle_base_url: puzzle_base_url.into(),
            genre_url: genre_url.into(),
            api_key: None,
            language: "en-US".into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Attach the API key sent to the genre endpoint.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the genre language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
