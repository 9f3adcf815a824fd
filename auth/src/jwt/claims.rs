use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::TokenError;

/// Kind of credential a token represents.
///
/// Access and refresh tokens share the signing key and are told apart
/// only by the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claim set carried by every token.
///
/// Timestamps are Unix seconds, as in RFC 7519.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (identity identifier)
    pub sub: String,

    /// Token type
    pub typ: TokenType,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

impl Claims {
    /// Build the claim set for a token minted at `now` that lives for `ttl`.
    pub fn new(subject: impl ToString, typ: TokenType, ttl: Duration, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();
        Self {
            sub: subject.to_string(),
            typ,
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token is valid strictly before `exp`; at `exp` it is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

/// A signed token together with its verified claims.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    pub(crate) fn new(raw: String, claims: Claims) -> Result<Self, TokenError> {
        if claims.exp <= claims.iat {
            return Err(TokenError::InvalidToken(
                "expiry is not after issued-at".to_string(),
            ));
        }
        if claims.sub.is_empty() {
            return Err(TokenError::InvalidToken("empty subject".to_string()));
        }
        Ok(Self { raw, claims })
    }

    /// Compact serialized form to hand to clients.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn token_type(&self) -> TokenType {
        self.claims.typ
    }

    pub fn id(&self) -> &str {
        &self.claims.jti
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.claims.iat)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.claims.exp)
    }

    /// Whole seconds left before the token expires at `now`.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.claims.exp - now.timestamp()).max(0)
    }
}

// Tokens are bearer secrets; keep the compact form out of debug output.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("raw", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
