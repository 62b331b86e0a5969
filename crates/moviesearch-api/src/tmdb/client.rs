//! `SearchClient` - TMDB movie search client implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::instrument;
use url::Url;

use super::api::LocalMovieSearchApi;
use super::error::NetworkError;
use super::observer::{
    CompletionEvent, DataEvent, ResponseEvent, TaskMetrics, TracingObserver, TransportObserver,
    redact_api_key,
};
use super::request::SearchRequest;
use super::types::{Movie, SearchResponse};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Maximum number of body bytes written to the trace log.
const BODY_PREVIEW_LEN: usize = 500;

/// TMDB movie search client.
///
/// Cheap to clone: the HTTP connection pool and the observer are shared.
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests, parsed per search.
    base_url: String,
    /// TMDB v3 API key.
    api_key: String,
    /// Receives raw transport events.
    observer: Arc<dyn TransportObserver>,
}

/// Builder for `SearchClient`.
#[derive(Debug)]
pub struct SearchClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
    observer: Option<Arc<dyn TransportObserver>>,
}

/// Handle to a search running in the background.
///
/// Dropping the handle does not cancel the search.
#[derive(Debug)]
pub struct SearchHandle {
    task: JoinHandle<()>,
}

impl SearchHandle {
    /// Aborts the in-flight request. The completion will not be invoked.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Returns `true` once the search task has finished or was aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Per-request counters feeding `TaskMetrics`.
#[derive(Debug, Default)]
struct TransferStats {
    status: Option<u16>,
    time_to_headers: Option<Duration>,
    bytes: usize,
    chunks: usize,
}

impl SearchClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            observer: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    ///
    /// The value is parsed when a search starts, not here.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the TMDB v3 API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the transport observer (default: `TracingObserver`).
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn TransportObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<SearchClient> {
        let api_key = self.api_key.context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL));

        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(TracingObserver));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(SearchClient {
            http_client,
            base_url,
            api_key,
            observer,
        })
    }
}

impl SearchClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> SearchClientBuilder {
        SearchClientBuilder::new()
    }

    /// Builds the `search/movie` URL for `term`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if the configured base URL is unusable.
    pub fn search_url(&self, term: &str) -> Result<Url, NetworkError> {
        SearchRequest::new(term, self.api_key.as_str()).url(&self.base_url)
    }

    /// Starts a search in the background and delivers the result to `completion`.
    ///
    /// If the URL cannot be built, `completion` is invoked immediately with
    /// `NetworkError::InvalidUrl` and `None` is returned: nothing was sent.
    /// Otherwise the request is dispatched on the tokio runtime and its
    /// handle is returned. `completion` is invoked at most once, and never
    /// if the handle is aborted first.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[instrument(skip_all)]
    pub fn spawn_search<F>(&self, term: &str, completion: F) -> Option<SearchHandle>
    where
        F: FnOnce(Result<Vec<Movie>, NetworkError>) + Send + 'static,
    {
        let url = match self.search_url(term) {
            Ok(url) => url,
            Err(e) => {
                completion(Err(e));
                return None;
            }
        };

        let client = self.clone();
        let task = tokio::spawn(async move {
            let result = client.execute(&url).await;
            completion(result);
        });

        Some(SearchHandle { task })
    }

    /// Runs a single GET to `url` and reports every phase to the observer.
    #[instrument(skip_all)]
    async fn execute(&self, url: &Url) -> Result<Vec<Movie>, NetworkError> {
        tracing::debug!(url = %redact_api_key(url), "TMDB search request");

        let started = Instant::now();
        let mut stats = TransferStats::default();
        let outcome = self.transfer(url, started, &mut stats).await;

        self.observer.on_metrics(&TaskMetrics {
            url,
            status: stats.status,
            time_to_headers: stats.time_to_headers,
            elapsed: started.elapsed(),
            bytes_received: stats.bytes,
            chunks_received: stats.chunks,
        });
        self.observer.on_complete(&CompletionEvent {
            url,
            error: outcome.as_ref().err(),
        });

        outcome.unwrap_or_else(|e| Err(NetworkError::Transport(e.to_string())))
    }

    /// Sends the request and accumulates the body.
    ///
    /// The outer `Err` is a transport failure; the inner result is the
    /// search outcome decided from status and body.
    async fn transfer(
        &self,
        url: &Url,
        started: Instant,
        stats: &mut TransferStats,
    ) -> Result<Result<Vec<Movie>, NetworkError>, reqwest::Error> {
        let mut response = self.http_client.get(url.clone()).send().await?;

        let status = response.status();
        stats.status = Some(status.as_u16());
        stats.time_to_headers = Some(started.elapsed());
        self.observer.on_response(&ResponseEvent {
            url,
            status,
            headers: response.headers(),
        });

        if status != StatusCode::OK {
            tracing::debug!(%status, "Unexpected status, body will not be read");
            return Ok(Err(NetworkError::InvalidResponseType));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            stats.bytes = body.len();
            stats.chunks = stats.chunks.saturating_add(1);
            self.observer.on_data(&DataEvent {
                url,
                chunk: &chunk,
                received: body.len(),
            });
        }

        tracing::debug!(body_len = body.len(), "Response body received");
        tracing::trace!(
            body_preview = %String::from_utf8_lossy(body.get(..BODY_PREVIEW_LEN).unwrap_or(&body)),
            "Response body preview"
        );

        Ok(decode_movies(&body))
    }
}

/// Decodes a `search/movie` document into its movie list.
fn decode_movies(body: &[u8]) -> Result<Vec<Movie>, NetworkError> {
    serde_json::from_slice::<SearchResponse>(body)
        .map(SearchResponse::into_movies)
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode search response");
            NetworkError::InvalidParse
        })
}

impl LocalMovieSearchApi for SearchClient {
    #[instrument(skip_all)]
    async fn search(&self, term: &str) -> Result<Vec<Movie>, NetworkError> {
        let url = self.search_url(term)?;
        self.execute(&url).await
    }
}
