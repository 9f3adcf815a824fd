mod common;

use std::sync::Arc;
use std::time::Duration;

use auth::RefreshPolicy;
use auth_service::domain::identity::errors::AuthError;
use auth_service::domain::identity::models::Credentials;
use auth_service::domain::identity::models::Identity;
use auth_service::domain::identity::models::IdentityId;
use auth_service::domain::identity::models::Password;
use auth_service::domain::identity::models::Username;
use auth_service::domain::identity::ports::AuthServicePort;
use auth_service::domain::identity::ports::CredentialStore;
use auth_service::domain::identity::service::AuthService;
use auth_service::outbound::repositories::PostgresCredentialStore;
use chrono::Utc;
use common::test_authenticator;
use common::TestClock;
use common::TestDb;

// These tests need a Postgres server; set DATABASE__URL to run them.

fn identity(username: &str) -> Identity {
    Identity {
        id: IdentityId::new(),
        username: Username::new(username.to_string()).unwrap(),
        password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        created_at: Utc::now(),
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials::new(
        Username::new(username.to_string()).unwrap(),
        Password::new(password.to_string()).unwrap(),
    )
}

async fn identity_count(db: &TestDb) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM identities")
        .fetch_one(&db.pool)
        .await
        .expect("Failed to count identities")
}

#[tokio::test]
async fn test_insert_and_find() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let store = PostgresCredentialStore::new(db.pool.clone());

    let created = store.insert_unique(identity("alice")).await.unwrap();

    let by_name = store
        .find_by_username(&created.username)
        .await
        .unwrap()
        .expect("Identity should be found by username");
    assert_eq!(by_name.id, created.id);
    assert_eq!(by_name.password_hash, created.password_hash);

    let by_id = store
        .find_by_id(&created.id)
        .await
        .unwrap()
        .expect("Identity should be found by id");
    assert_eq!(by_id.username, created.username);

    let missing = store
        .find_by_username(&Username::new("nobody".to_string()).unwrap())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected_by_constraint() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let store = PostgresCredentialStore::new(db.pool.clone());

    store.insert_unique(identity("alice")).await.unwrap();
    let result = store.insert_unique(identity("alice")).await;

    assert!(matches!(result, Err(AuthError::DuplicateUserName(ref name)) if name == "alice"));
    assert_eq!(identity_count(&db).await, 1);
}

#[tokio::test]
async fn test_concurrent_inserts_admit_exactly_one() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let store = Arc::new(PostgresCredentialStore::new(db.pool.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.insert_unique(identity("alice")).await })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::DuplicateUserName(_)) => duplicates += 1,
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(identity_count(&db).await, 1);
}

#[tokio::test]
async fn test_service_registration_and_login_against_postgres() {
    let Some(db) = TestDb::new().await else {
        return;
    };
    let service = Arc::new(AuthService::new(
        Arc::new(PostgresCredentialStore::new(db.pool.clone())),
        test_authenticator(RefreshPolicy::Rotate),
        Arc::new(TestClock::new()),
        Duration::from_secs(2),
    ));

    let created = service
        .register(credentials("alice", "pw1"))
        .await
        .expect("Registration should succeed");

    let duplicate = service.register(credentials("alice", "pw2")).await;
    assert!(matches!(duplicate, Err(AuthError::DuplicateUserName(_))));

    let pair = service
        .login(&credentials("alice", "pw1"))
        .await
        .expect("Login should succeed");
    assert_eq!(pair.access.subject(), created.id.to_string());

    // The rejected registration must not have replaced the stored password.
    let rejected = service.login(&credentials("alice", "pw2")).await;
    assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));
}
