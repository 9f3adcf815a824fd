use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenPair;

use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::identity::errors::AuthError;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::Clock;
use crate::identity::ports::CredentialStore;

/// Domain service implementation for registration, login and refresh.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<CS, CL>
where
    CS: CredentialStore,
    CL: Clock,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    clock: Arc<CL>,
    store_timeout: Duration,
}

impl<CS, CL> AuthService<CS, CL>
where
    CS: CredentialStore,
    CL: Clock,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `authenticator` - Shared password hasher and token issuer
    /// * `clock` - Time source for token minting and validation
    /// * `store_timeout` - Upper bound for each credential store call
    pub fn new(
        store: Arc<CS>,
        authenticator: Arc<Authenticator>,
        clock: Arc<CL>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            authenticator,
            clock,
            store_timeout,
        }
    }

    /// Run Argon2 work on the blocking pool so it does not stall a runtime worker.
    async fn off_worker<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(work).await.map_err(|e| {
            tracing::error!(error = %e, "Password hashing task failed");
            AuthError::Internal(e.to_string())
        })
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AuthError>> + Send,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(AuthError::StorageUnavailable(format!(
                    "{} timed out",
                    operation
                )))
            }
        }
    }
}

#[async_trait]
impl<CS, CL> AuthServicePort for AuthService<CS, CL>
where
    CS: CredentialStore,
    CL: Clock,
{
    async fn register(&self, credentials: Credentials) -> Result<Identity, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = credentials.password.clone();
        let password_hash = self
            .off_worker(move || authenticator.hash_password(password.expose()))
            .await?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let identity = Identity {
            id: IdentityId::new(),
            username: credentials.username,
            password_hash,
            created_at: self.clock.now(),
        };

        let created = self
            .with_timeout("insert_unique", self.store.insert_unique(identity))
            .await?;

        tracing::info!(identity_id = %created.id, "Identity registered");
        Ok(created)
    }

    async fn verify_credentials(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let stored = self
            .with_timeout(
                "find_by_username",
                self.store.find_by_username(&credentials.username),
            )
            .await?;

        // An unknown username takes the same verification path as a wrong password.
        let authenticator = Arc::clone(&self.authenticator);
        let password = credentials.password.clone();
        let stored_hash = stored
            .as_ref()
            .map(|identity| identity.password_hash.clone());
        self.off_worker(move || {
            authenticator.verify_password(password.expose(), stored_hash.as_deref())
        })
        .await??;

        stored.ok_or(AuthError::InvalidCredentials)
    }

    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let identity = match self.verify_credentials(credentials).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(code = e.code(), "Login rejected");
                return Err(e);
            }
        };

        let pair = self
            .authenticator
            .issue_tokens(&identity.id.to_string(), self.clock.now())?;

        tracing::info!(identity_id = %identity.id, "Login succeeded");
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let pair = self
            .authenticator
            .refresh_tokens(refresh_token, self.clock.now())
            .map_err(|e| {
                tracing::warn!(reason = %e, "Refresh rejected");
                AuthError::from(e)
            })?;

        tracing::info!(identity_id = %pair.access.subject(), "Tokens refreshed");
        Ok(pair)
    }

    async fn authenticate(&self, access_token: &str) -> Result<IdentityId, AuthError> {
        let token = self
            .authenticator
            .validate_access_token(access_token, self.clock.now())?;

        IdentityId::from_string(token.subject()).map_err(|e| {
            tracing::error!(error = %e, "Access token subject is not an identity ID");
            AuthError::InvalidToken
        })
    }

    async fn get_identity(&self, id: &IdentityId) -> Result<Identity, AuthError> {
        self.with_timeout("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or(AuthError::NotFound(id.to_string()))
    }
}
