use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Username;
use crate::identity::errors::AuthError;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// # Arguments
    /// * `credentials` - Validated username and plaintext password
    ///
    /// # Returns
    /// Created identity
    ///
    /// # Errors
    /// * `DuplicateUserName` - Username is already taken
    /// * `StorageUnavailable` - Credential store unreachable or too slow
    async fn register(&self, credentials: Credentials) -> Result<Identity, AuthError>;

    /// Check a username/password pair against the stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password, indistinguishably
    /// * `StorageUnavailable` - Credential store unreachable or too slow
    async fn verify_credentials(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `StorageUnavailable` - Credential store unreachable or too slow
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// Never touches the credential store.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, badly signed, or not a refresh token
    /// * `ExpiredToken` - Refresh token is at or past its expiry
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Resolve a bearer access token to the identity ID it was issued for.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, badly signed, or not an access token
    /// * `ExpiredToken` - Access token is at or past its expiry
    async fn authenticate(&self, access_token: &str) -> Result<IdentityId, AuthError>;

    /// Retrieve an identity by its identifier.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `StorageUnavailable` - Credential store unreachable or too slow
    async fn get_identity(&self, id: &IdentityId) -> Result<Identity, AuthError>;
}

/// Persistence operations for identities.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new identity unless its username is taken.
    ///
    /// The check and the insert are one atomic step; two concurrent calls
    /// with the same username never both succeed.
    ///
    /// # Errors
    /// * `DuplicateUserName` - Username is already taken (nothing is written)
    /// * `StorageUnavailable` - Store unreachable
    async fn insert_unique(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Retrieve identity by username.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, AuthError>;

    /// Retrieve identity by identifier.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError>;
}

/// Source of the current time for token minting and expiry checks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
