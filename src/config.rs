//! Application-level configuration loading: endpoints, storage location and game rules.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::state::GameRules;

/// Default location on disk where the driver looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MOVIE_GUESS_CONFIG_PATH";
/// Environment variable that overrides the configured movie database API key.
const API_KEY_ENV: &str = "TMDB_API_KEY";

const DEFAULT_PUZZLE_API_URL: &str = "http://localhost:8080";
const DEFAULT_GENRE_API_URL: &str = "https://api.themoviedb.org/3/genre/movie/list";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_STORAGE_DIR: &str = ".movie-guess/sessions";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Base URL of the puzzle API (`/puzzle/` and `/puzzle/{id}` live below it).
    pub puzzle_api_url: String,
    /// Full URL of the genre list endpoint.
    pub genre_api_url: String,
    /// API key sent to the genre endpoint.
    pub api_key: Option<String>,
    /// Language requested for genre names.
    pub language: String,
    /// Directory holding one session record per puzzle.
    pub storage_dir: PathBuf,
    /// Timeout applied to every provider request.
    pub request_timeout: Duration,
    /// Win/loss thresholds.
    pub rules: GameRules,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let mut config = Self::load_from(&resolve_config_path());
        if let Some(key) = env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()) {
            config.api_key = Some(key);
        }
        config
    }

    /// Load the configuration from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(path = %path.display(), "loaded configuration");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; omitted fields take their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Endpoint settings for the HTTP providers.
    #[cfg(feature = "http-providers")]
    pub fn provider_config(&self) -> crate::providers::http::HttpProviderConfig {
        let mut config = crate::providers::http::HttpProviderConfig::new(
            self.puzzle_api_url.clone(),
            self.genre_api_url.clone(),
        )
        .with_language(self.language.clone())
        .with_timeout(self.request_timeout);
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    puzzle_api_url: String,
    genre_api_url: String,
    api_key: Option<String>,
    language: String,
    storage_dir: PathBuf,
    request_timeout_ms: u64,
    rules: GameRules,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            puzzle_api_url: DEFAULT_PUZZLE_API_URL.into(),
            genre_api_url: DEFAULT_GENRE_API_URL.into(),
            api_key: None,
            language: DEFAULT_LANGUAGE.into(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            rules: GameRules::default(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let rules = match value.rules.validate() {
            Ok(()) => value.rules,
            Err(err) => {
                warn!(error = %err, "invalid game rules; using defaults");
                GameRules::default()
            }
        };

        Self {
            puzzle_api_url: value.puzzle_api_url,
            genre_api_url: value.genre_api_url,
            api_key: value.api_key.filter(|key| !key.is_empty()),
            language: value.language,
            storage_dir: value.storage_dir,
            request_timeout: Duration::from_millis(value.request_timeout_ms),
            rules,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
