use chrono::DateTime;
use chrono::Utc;

use crate::jwt::Token;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenPair;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Built once at startup and shared; holds the only copy of the signing keys.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    pub fn new(password_hasher: PasswordHasher, token_issuer: TokenIssuer) -> Self {
        Self {
            password_hasher,
            token_issuer,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against the stored hash of an account.
    ///
    /// `stored_hash` is `None` when no account exists; the outcome is then the
    /// same `InvalidCredentials` a wrong password produces.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No account, or password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash)?,
            None => self.password_hasher.verify_absent(password),
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }
        Ok(())
    }

    /// Issue a fresh token pair for an already verified subject.
    pub fn issue_tokens(&self, subject: &str, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        self.token_issuer.issue_for(subject, now)
    }

    /// Exchange a refresh token for a new pair without any password check.
    pub fn refresh_tokens(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        self.token_issuer.refresh(refresh_token, now)
    }

    /// Validate an access token and return its verified claims.
    pub fn validate_access_token(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        self.token_issuer.verify_access(access_token, now)
    }
}
