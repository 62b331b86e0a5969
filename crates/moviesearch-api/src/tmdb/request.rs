//! `SearchRequest` and search URL construction.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use super::error::NetworkError;

/// Response language sent with every search.
pub const SEARCH_LANGUAGE: &str = "en-us";

/// Result page requested by every search. Only the first page is fetched.
pub const SEARCH_PAGE: u32 = 1;

/// Endpoint path, relative to the API base URL.
const SEARCH_MOVIE_PATH: &str = "search/movie";

/// Query component encoding: everything except RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Parameters for a single `search/movie` request.
///
/// Built fresh per search and consumed when the URL is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query, sent verbatim.
    pub query: String,
    /// Response language, always `SEARCH_LANGUAGE`.
    language: String,
    /// Result page, always `SEARCH_PAGE`.
    page: u32,
    /// TMDB v3 API key.
    pub api_key: String,
}

impl SearchRequest {
    /// Creates a request for the first page in `en-us`.
    pub fn new(query: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from(SEARCH_LANGUAGE),
            page: SEARCH_PAGE,
            api_key: api_key.into(),
        }
    }

    /// Response language sent with this request.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Result page requested.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Builds the request URL against `base_url`.
    ///
    /// Query parameters are always emitted in the order
    /// `api_key`, `language`, `query`, `page`. Values are percent-encoded
    /// as URL components, so a space is sent as `%20`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidUrl` if `base_url` does not parse,
    /// is not `http`/`https`, or cannot have the endpoint path joined.
    pub fn url(&self, base_url: &str) -> Result<Url, NetworkError> {
        let mut base = Url::parse(base_url).map_err(|e| {
            tracing::debug!(%base_url, error = %e, "Failed to parse base URL");
            NetworkError::InvalidUrl
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            tracing::debug!(%base_url, scheme = base.scheme(), "Unsupported base URL scheme");
            return Err(NetworkError::InvalidUrl);
        }

        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut url = base.join(SEARCH_MOVIE_PATH).map_err(|e| {
            tracing::debug!(%base_url, error = %e, "Failed to join search path");
            NetworkError::InvalidUrl
        })?;

        let page = self.page.to_string();
        let query = [
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("query", self.query.as_str()),
            ("page", page.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, QUERY_COMPONENT)))
        .collect::<Vec<_>>()
        .join("&");
        url.set_query(Some(&query));

        Ok(url)
    }
}
