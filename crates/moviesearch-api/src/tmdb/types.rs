//! TMDB `search/movie` response types.

use serde::Deserialize;
use url::Url;

/// Base URL for TMDB poster images. The size segment follows directly.
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Poster size used by list views.
pub const POSTER_SIZE_W500: &str = "w500";

/// Response from `search/movie` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Current page number.
    pub page: u32,
    /// Search results, in server order.
    pub results: Vec<Movie>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

impl SearchResponse {
    /// Consumes the response, keeping only the movie list.
    #[must_use]
    pub fn into_movies(self) -> Vec<Movie> {
        self.results
    }
}

/// A single movie search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Overview text.
    pub overview: Option<String>,
    /// Poster image path (e.g. "/abc.jpg").
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD, empty, or null).
    pub release_date: Option<String>,
    /// Vote average (0.0-10.0).
    pub vote_average: f64,
}

impl Movie {
    /// Returns the full poster image URL for the given size (e.g. `"w500"`).
    ///
    /// Returns `None` when the movie has no poster.
    #[must_use]
    pub fn poster_url(&self, size: &str) -> Option<Url> {
        let path = self.poster_path.as_deref()?;
        let base = Url::parse(IMAGE_BASE_URL).ok()?;
        base.join(&format!("{size}{path}")).ok()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]
    #![allow(clippy::float_cmp)]

    use super::*;

    #[test]
    fn test_parse_search_movie_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/search_movie_arrival.json");

        // Act
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(response.page, 1);
        assert_eq!(response.total_results, 2);
        assert_eq!(response.results.len(), 2);
        let first = &response.results[0];
        assert_eq!(first.id, 329_865);
        assert_eq!(first.title, "Arrival");
        assert_eq!(first.release_date.as_deref(), Some("2016-11-10"));
        assert_eq!(first.vote_average, 7.6);
    }

    #[test]
    fn test_parse_search_movie_empty_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/search_movie_empty.json");

        // Act
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(response.total_pages, 0);
        assert!(response.into_movies().is_empty());
    }

    #[test]
    fn test_parse_minimal_movie_without_overview() {
        // Arrange
        let json = r#"{"page":1,"results":[{"id":1,"title":"A","poster_path":null,"release_date":"2020-01-01","vote_average":7.5}],"total_pages":1,"total_results":1}"#;

        // Act
        let movies = serde_json::from_str::<SearchResponse>(json)
            .unwrap()
            .into_movies();

        // Assert
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "A");
        assert!(movies[0].overview.is_none());
        assert!(movies[0].poster_path.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_title() {
        // Arrange
        let json = r#"{"page":1,"results":[{"id":1,"vote_average":7.5}],"total_pages":1,"total_results":1}"#;

        // Act
        let result = serde_json::from_str::<SearchResponse>(json);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_poster_url_joins_size_and_path() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/search_movie_arrival.json");
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        // Act
        let url = response.results[0].poster_url(POSTER_SIZE_W500).unwrap();

        // Assert
        assert_eq!(
            url.as_str(),
            "https://image.tmdb.org/t/p/w500/x2FJsf1ElAgr63Y3PNPtJrcmpoe.jpg"
        );
    }

    #[test]
    fn test_poster_url_none_without_poster() {
        // Arrange
        let json = include_str!("../../../../fixtures/tmdb/search_movie_arrival.json");
        let response: SearchResponse = serde_json::from_str(json).unwrap();

        // Act & Assert
        assert!(response.results[1].poster_url(POSTER_SIZE_W500).is_none());
    }
}
