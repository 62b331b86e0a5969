//! API client library for moviesearch.
//!
//! Provides a client for the TMDB movie search endpoint.

/// TMDB movie search client.
pub mod tmdb;
