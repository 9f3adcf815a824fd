use thiserror::Error;

use super::claims::TokenType;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Expected a {expected} token, got a {actual} token")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Token is expired")]
    TokenExpired,

    #[error("Refresh lifetime ({refresh_seconds}s) must be longer than access lifetime ({access_seconds}s)")]
    InvalidLifetimes {
        access_seconds: i64,
        refresh_seconds: i64,
    },
}
