use crate::{error::StoreError, models::Identity};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// CredentialStore Trait
///
/// The persistence contract the authentication layer consumes. The store owns the
/// identity lifecycle; the auth layer only reads identities and asks for password updates.
///
/// **Send + Sync + async_trait** are required so `Arc<dyn CredentialStore>` can live in
/// the shared application state and be awaited from any request task.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // Exact, case-sensitive match on both fields. No match is `StoreError::NotFound`.
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError>;

    // Mutates the password column only. Unknown id is `StoreError::NotFound`.
    async fn update_password(&self, id: Uuid, new_password: &str) -> Result<(), StoreError>;
}

/// CredentialStoreState
///
/// The concrete type used to share the credential store across the application state.
pub type CredentialStoreState = Arc<dyn CredentialStore>;

/// UserRow
///
/// Raw row of the `users` table. Roles are stored as a `TEXT[]` of labels.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password: String,
    roles: Vec<String>,
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            id: row.id,
            username: row.username,
            password: Some(row.password),
            roles: row.roles.into_iter().map(Into::into).collect(),
            token: None,
        }
    }
}

/// PostgresCredentialStore
///
/// `CredentialStore` backed by the `users` table (see `migrations/`).
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Creates a new store using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// insert_user
    ///
    /// Seeds a user row. Identity creation belongs to the user CRUD layer; this exists for
    /// bootstrapping and tests.
    pub async fn insert_user(&self, identity: &Identity) -> Result<(), StoreError> {
        let roles: Vec<String> = identity.roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query("INSERT INTO users (id, username, password, roles) VALUES ($1, $2, $3, $4)")
            .bind(identity.id)
            .bind(&identity.username)
            .bind(identity.password.as_deref().unwrap_or_default())
            .bind(roles)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, roles FROM users WHERE username = $1 AND password = $2",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("find_by_credentials error: {:?}", e);
            StoreError::from(e)
        })?;

        row.map(Identity::from).ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, roles FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("find_by_id error: {:?}", e);
            StoreError::from(e)
        })?;

        row.map(Identity::from).ok_or(StoreError::NotFound)
    }

    async fn update_password(&self, id: Uuid, new_password: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(new_password)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("update_password error: {:?}", e);
                StoreError::from(e)
            })?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}

/// InMemoryCredentialStore
///
/// Map-backed `CredentialStore` used when no database is configured in local mode,
/// and by the test-suite.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        let users = identities.into_iter().map(|i| (i.id, i)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn insert(&self, identity: Identity) {
        self.users.write().await.insert(identity.id, identity);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username == username && u.password.as_deref() == Some(password))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_password(&self, id: Uuid, new_password: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password = Some(new_password.to_string());
        Ok(())
    }
}
