//! Search failure taxonomy.

use thiserror::Error;

/// Terminal failure of a single movie search.
///
/// Every variant is delivered through the same result channel as a
/// successful search. None of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum NetworkError {
    /// The request URL could not be built. Nothing was sent.
    #[error("invalid search URL")]
    InvalidUrl,
    /// The server answered with a status other than 200. The body is ignored.
    #[error("unexpected HTTP response status")]
    InvalidResponseType,
    /// The body was received but is not a movie search document.
    #[error("failed to decode search response")]
    InvalidParse,
    /// The HTTP transport failed before a result could be decided.
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(NetworkError::InvalidUrl.to_string(), "invalid search URL");
        assert_eq!(
            NetworkError::InvalidResponseType.to_string(),
            "unexpected HTTP response status"
        );
        assert_eq!(
            NetworkError::InvalidParse.to_string(),
            "failed to decode search response"
        );
        assert_eq!(
            NetworkError::Transport(String::from("connection refused")).to_string(),
            "transport error: connection refused"
        );
    }
}
