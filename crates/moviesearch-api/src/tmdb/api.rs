//! `MovieSearchApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::NetworkError;
use super::types::Movie;

/// Movie search API trait.
///
/// Abstracts the search operation for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieSearchApi: Send)]
pub trait LocalMovieSearchApi {
    /// Searches movies matching `term` (first page only).
    ///
    /// # Errors
    ///
    /// Returns a `NetworkError` if the URL cannot be built, the status is
    /// not 200, the body cannot be decoded, or the transport fails.
    async fn search(&self, term: &str) -> Result<Vec<Movie>, NetworkError>;
}
