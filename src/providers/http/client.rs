use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::{
    providers::{GenreProvider, ProviderResult, PuzzleProvider, PuzzleRequest},
    state::game::{Genre, Puzzle},
};

use super::{
    config::HttpProviderConfig,
    error::{HttpProviderError, HttpResult},
    models::{GenreListResponse, PuzzleResponse},
};

const PUZZLE_SEGMENT: &str = "puzzle";

/// Puzzle provider backed by the puzzle REST API.
#[derive(Clone)]
pub struct HttpPuzzleProvider {
    client: Client,
    base_url: Arc<Url>,
}

impl HttpPuzzleProvider {
    /// Build a provider for the configured puzzle API.
    pub fn new(config: &HttpProviderConfig) -> HttpResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: Arc::new(parse_base_url(&config.puzzle_base_url)?),
        })
    }

    /// `{base}/puzzle/` for the latest puzzle, `{base}/puzzle/{id}` otherwise.
    fn puzzle_url(&self, request: &PuzzleRequest) -> HttpResult<Url> {
        let mut url = Url::clone(&self.base_url);
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| HttpProviderError::InvalidUrl {
                        url: self.base_url.to_string(),
                        reason: "cannot be a base".into(),
                    })?;
            segments.pop_if_empty().push(PUZZLE_SEGMENT);
            match request {
                PuzzleRequest::Latest => segments.push(""),
                PuzzleRequest::Id(id) => segments.push(id.as_str()),
            };
        }
        Ok(url)
    }

    async fn fetch(&self, request: PuzzleRequest) -> HttpResult<Puzzle> {
        let url = self.puzzle_url(&request)?;
        debug!(%request, %url, "fetching puzzle");

        let response: PuzzleResponse = get_json(&self.client, url.clone(), &[]).await?;
        response
            .validate()
            .map_err(|errors| HttpProviderError::InvalidPayload {
                url: url.to_string(),
                reason: errors.to_string(),
            })?;

        Ok(response.into())
    }
}

impl PuzzleProvider for HttpPuzzleProvider {
    fn get_puzzle(&self, request: PuzzleRequest) -> BoxFuture<'static, ProviderResult<Puzzle>> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch(request).await.map_err(Into::into) })
    }
}

/// Genre provider backed by the movie database genre list.
#[derive(Clone)]
pub struct HttpGenreProvider {
    client: Client,
    url: Arc<Url>,
    api_key: Option<Arc<str>>,
    language: Arc<str>,
}

impl HttpGenreProvider {
    /// Build a provider for the configured genre endpoint.
    pub fn new(config: &HttpProviderConfig) -> HttpResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: Arc::new(parse_base_url(&config.genre_url)?),
            api_key: config.api_key.as_deref().map(Arc::from),
            language: Arc::from(config.language.as_str()),
        })
    }

    async fn fetch(&self) -> HttpResult<Vec<Genre>> {
        let mut query = vec![("language", self.language.to_string())];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.to_string()));
        }

        let response: GenreListResponse =
            get_json(&self.client, Url::clone(&self.url), &query).await?;
        Ok(response.genres.into_iter().map(Into::into).collect())
    }
}

impl GenreProvider for HttpGenreProvider {
    fn get_genres(&self) -> BoxFuture<'static, ProviderResult<Vec<Genre>>> {
        let provider = self.clone();
        Box::pin(async move { provider.fetch().await.map_err(Into::into) })
    }
}

fn build_client(config: &HttpProviderConfig) -> HttpResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|source| HttpProviderError::ClientBuilder { source })
}

fn parse_base_url(raw: &str) -> HttpResult<Url> {
    Url::parse(raw).map_err(|err| HttpProviderError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })
}

async fn get_json<T>(client: &Client, url: Url, query: &[(&str, String)]) -> HttpResult<T>
where
    T: DeserializeOwned,
{
    let path = url.to_string();
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| HttpProviderError::RequestSend {
            url: path.clone(),
            source,
        })?;

    match response.status() {
        status if status.is_success() => response
            .json::<T>()
            .await
            .map_err(|source| HttpProviderError::DecodeResponse { url: path, source }),
        other => Err(HttpProviderError::RequestStatus {
            url: path,
            status: other,
        }),
    }
}
