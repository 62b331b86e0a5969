//! TMDB movie search module.
//!
//! Builds `search/movie` requests against the TMDB API v3, streams the
//! response through a `TransportObserver`, and decodes the movie list.

mod api;
mod client;
mod error;
mod observer;
mod request;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieSearchApi, MovieSearchApi};
pub use client::{SearchClient, SearchClientBuilder, SearchHandle};
pub use error::NetworkError;
pub use observer::{
    CompletionEvent, DataEvent, ResponseEvent, TaskMetrics, TracingObserver, TransportObserver,
    redact_api_key,
};
pub use request::{SEARCH_LANGUAGE, SEARCH_PAGE, SearchRequest};
pub use types::{Movie, POSTER_SIZE_W500, SearchResponse};
