//! Credential and token primitives
//!
//! Provides the building blocks of the login and refresh flows:
//! - Password hashing (Argon2id)
//! - Signed access/refresh token encoding and validation
//! - Token pair issuance and refresh exchange
//! - Authentication coordination
//!
//! Storage is not handled here; services supply their own credential store
//! and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenType};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let token = codec.encode("user123", TokenType::Access, Duration::minutes(15)).unwrap();
//! let decoded = codec.decode(token.as_str()).unwrap();
//! assert_eq!(decoded.subject(), "user123");
//! ```
//!
//! ## Login and Refresh
//! ```
//! use auth::{Authenticator, PasswordHasher, RefreshPolicy, TokenCodec, TokenIssuer, TokenLifetimes};
//! use chrono::Utc;
//!
//! let issuer = TokenIssuer::new(
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!"),
//!     TokenLifetimes::default(),
//!     RefreshPolicy::Rotate,
//! );
//! let auth = Authenticator::new(PasswordHasher::new(), issuer);
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue tokens
//! auth.verify_password("password123", Some(&hash)).unwrap();
//! let pair = auth.issue_tokens("user123", Utc::now()).unwrap();
//!
//! // Refresh: no password needed
//! let refreshed = auth.refresh_tokens(pair.refresh.as_str(), Utc::now()).unwrap();
//! assert_eq!(refreshed.access.subject(), "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::RefreshPolicy;
pub use jwt::Token;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenLifetimes;
pub use jwt::TokenPair;
pub use jwt::TokenType;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
