use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Token;
use super::claims::TokenType;
use super::errors::TokenError;

/// Token codec for encoding and decoding signed tokens.
///
/// Uses HS256 (HMAC with SHA-256). The same key signs access and refresh
/// tokens; the `typ` claim distinguishes them.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Mint a token for `subject` that lives for `ttl` from now.
    pub fn encode(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<Token, TokenError> {
        self.encode_at(subject, token_type, ttl, Utc::now())
    }

    /// Mint a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    /// * `InvalidToken` - `ttl` is not positive or the subject is empty
    pub fn encode_at(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let claims = Claims::new(subject, token_type, ttl, now);
        let header = Header::new(self.algorithm);

        let raw = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Token::new(raw, claims)
    }

    /// Decode and validate a token against the current time.
    pub fn decode(&self, token: &str) -> Result<Token, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Decode and validate a token as if the current time were `now`.
    ///
    /// The signature and claim structure are verified first; expiry is only
    /// checked on a token that passed those.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, badly signed or inconsistent token
    /// * `TokenExpired` - Well-signed token at or past its expiry
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let verified = self.verify_signature(token)?;
        Self::check_expiry(verified, now)
    }

    /// Decode a token that must be of `expected` type.
    ///
    /// A token of the other type is rejected as `WrongType` before its expiry
    /// is considered.
    pub fn decode_expecting(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let verified = self.verify_signature(token)?;

        if verified.token_type() != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: verified.token_type(),
            });
        }

        Self::check_expiry(verified, now)
    }

    fn verify_signature(&self, token: &str) -> Result<Token, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked by `check_expiry` with no leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        Token::new(token.to_string(), token_data.claims)
    }

    fn check_expiry(token: Token, now: DateTime<Utc>) -> Result<Token, TokenError> {
        if token.claims().is_expired(now.timestamp()) {
            return Err(TokenError::TokenExpired);
        }
        Ok(token)
    }
}
