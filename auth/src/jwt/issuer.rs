use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::Token;
use super::claims::TokenType;
use super::codec::TokenCodec;
use super::errors::TokenError;

/// How long each kind of token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    /// Build lifetimes, rejecting a refresh window that is not strictly
    /// longer than the access window.
    pub fn new(access: Duration, refresh: Duration) -> Result<Self, TokenError> {
        if access <= Duration::zero() || refresh <= access {
            return Err(TokenError::InvalidLifetimes {
                access_seconds: access.num_seconds(),
                refresh_seconds: refresh.num_seconds(),
            });
        }
        Ok(Self { access, refresh })
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// What happens to the refresh token during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Mint a new refresh token alongside the new access token.
    #[default]
    Rotate,
    /// Hand the presented refresh token back unchanged.
    Reuse,
}

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Token,
    pub refresh: Token,
}

/// Mints token pairs and exchanges refresh tokens for new pairs.
pub struct TokenIssuer {
    codec: TokenCodec,
    lifetimes: TokenLifetimes,
    policy: RefreshPolicy,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, lifetimes: TokenLifetimes, policy: RefreshPolicy) -> Self {
        Self {
            codec,
            lifetimes,
            policy,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Mint an access and a refresh token bound to `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_for(&self, subject: &str, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.mint_access(subject, now)?,
            refresh: self
                .codec
                .encode_at(subject, TokenType::Refresh, self.lifetimes.refresh, now)?,
        })
    }

    /// Exchange a refresh token for a new pair for the same subject.
    ///
    /// Only proof of possession of a valid refresh token is needed; no
    /// credential is re-checked.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed or badly signed token
    /// * `WrongType` - An access token was presented
    /// * `TokenExpired` - The refresh token is at or past its expiry
    pub fn refresh(&self, presented: &str, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let refresh = self
            .codec
            .decode_expecting(presented, TokenType::Refresh, now)?;
        let access = self.mint_access(refresh.subject(), now)?;

        let refresh = match self.policy {
            RefreshPolicy::Rotate => self.codec.encode_at(
                refresh.subject(),
                TokenType::Refresh,
                self.lifetimes.refresh,
                now,
            )?,
            RefreshPolicy::Reuse => refresh,
        };

        Ok(TokenPair { access, refresh })
    }

    /// Validate an access token presented on a protected call.
    pub fn verify_access(&self, presented: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        self.codec
            .decode_expecting(presented, TokenType::Access, now)
    }

    fn mint_access(&self, subject: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        self.codec
            .encode_at(subject, TokenType::Access, self.lifetimes.access, now)
    }
}
