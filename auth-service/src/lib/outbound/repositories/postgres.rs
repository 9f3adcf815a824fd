use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Username;
use crate::domain::identity::ports::CredentialStore;
use crate::identity::errors::AuthError;

const USERNAME_CONSTRAINT: &str = "identities_username_key";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = AuthError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: IdentityId(row.id),
            username: Username::new(row.username)
                .map_err(|e| AuthError::Storage(format!("Stored username is invalid: {}", e)))?,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// SQLSTATE codes a server reports when it cannot serve the connection right now.
fn is_unavailable_state(code: &str) -> bool {
    // Class 08 covers connection exceptions; 53 is insufficient resources.
    code.starts_with("08")
        || code.starts_with("53")
        || matches!(code, "57P01" | "57P02" | "57P03")
}

/// Classify a driver error as an outage (retryable) or a hard failure.
fn storage_error(e: sqlx::Error) -> AuthError {
    let unavailable = match &e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| is_unavailable_state(&code))
            .unwrap_or(false),
        _ => false,
    };

    if unavailable {
        AuthError::StorageUnavailable(e.to_string())
    } else {
        AuthError::Storage(e.to_string())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn insert_unique(&self, identity: Identity) -> Result<Identity, AuthError> {
        // The unique constraint makes check-and-insert a single statement.
        sqlx::query(
            r#"
            INSERT INTO identities (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.username.as_str())
        .bind(&identity.password_hash)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_CONSTRAINT)
                {
                    return AuthError::DuplicateUserName(identity.username.as_str().to_string());
                }
            }
            storage_error(e)
        })?;

        Ok(identity)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM identities
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Identity::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let error = storage_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, AuthError::StorageUnavailable(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_protocol_error_is_unavailable() {
        let error = storage_error(sqlx::Error::Protocol("unexpected message".to_string()));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_server_side_outage_states() {
        assert!(is_unavailable_state("08006"));
        assert!(is_unavailable_state("57P01"));
        assert!(is_unavailable_state("53300"));
        assert!(!is_unavailable_state("23505"));
        assert!(!is_unavailable_state("42P01"));
    }

    #[test]
    fn test_row_not_found_is_hard_failure() {
        let error = storage_error(sqlx::Error::RowNotFound);
        assert!(matches!(error, AuthError::Storage(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_row_conversion() {
        let id = Uuid::new_v4();
        let identity = Identity::try_from(IdentityRow {
            id,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(identity.id, IdentityId(id));
        assert_eq!(identity.username.as_str(), "alice");
    }
}
