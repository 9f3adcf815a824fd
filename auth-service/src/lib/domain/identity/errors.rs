use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for Password validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password too long: maximum {max} bytes")]
    TooLong { max: usize },
}

/// Top-level error for register, login, refresh and token checks.
///
/// Every variant maps to one stable code in `code()`. Messages never carry
/// passwords or token strings.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    // Authentication outcomes
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    DuplicateUserName(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Identity not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Credential store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Credential store error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidUsername(_) | AuthError::InvalidPassword(_) => "VALIDATION_FAILED",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::DuplicateUserName(_) => "DUPLICATE_USER_NAME",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AuthError::Storage(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Only a transient store outage is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StorageUnavailable(_))
    }
}

impl From<auth::TokenError> for AuthError {
    fn from(err: auth::TokenError) -> Self {
        match err {
            auth::TokenError::TokenExpired => AuthError::ExpiredToken,
            auth::TokenError::InvalidToken(_) | auth::TokenError::WrongType { .. } => {
                AuthError::InvalidToken
            }
            auth::TokenError::EncodingFailed(_) | auth::TokenError::InvalidLifetimes { .. } => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

impl From<auth::AuthenticationError> for AuthError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            auth::AuthenticationError::PasswordError(e) => AuthError::Internal(e.to_string()),
            auth::AuthenticationError::TokenError(e) => AuthError::from(e),
        }
    }
}
