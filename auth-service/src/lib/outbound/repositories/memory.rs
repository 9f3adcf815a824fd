use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Username;
use crate::domain::identity::ports::CredentialStore;
use crate::identity::errors::AuthError;

/// Process-local credential store.
///
/// Used when no database is configured and by the HTTP tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    /// Map of username -> identity
    by_username: Arc<RwLock<HashMap<Username, Identity>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.by_username.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.by_username.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert_unique(&self, identity: Identity) -> Result<Identity, AuthError> {
        // Lookup and insert happen under one write guard.
        let mut identities = self.by_username.write().await;

        match identities.entry(identity.username.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateUserName(
                identity.username.as_str().to_string(),
            )),
            Entry::Vacant(slot) => Ok(slot.insert(identity).clone()),
        }
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, AuthError> {
        Ok(self.by_username.read().await.get(username).cloned())
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .by_username
            .read()
            .await
            .values()
            .find(|identity| identity.id == *id)
            .cloned())
    }
}
