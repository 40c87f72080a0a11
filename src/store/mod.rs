pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::tag::Tag;
use crate::models::todo::{NewTodo, Ownership, Todo, TodoChanges};
use crate::models::token::{NewToken, TokenRow};
use crate::models::user::User;

/// Opaque persistence failure. Never retried here; callers report a server fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Persistence backend shared by every service.
/// Implementations: `PgStore` (Postgres via sqlx) and `MemoryStore`.
///
/// Each method is a single atomic statement; nothing here spans a transaction.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness probe used by `/readyz`.
    async fn ping(&self) -> Result<(), StoreError>;

    // -- Users --

    async fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;

    // -- Tokens --

    async fn insert_token(&self, token: &NewToken) -> Result<i64, StoreError>;

    async fn find_token_by_value(&self, value: &str) -> Result<Option<TokenRow>, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_token(&self, id: i64) -> Result<u64, StoreError>;

    // -- Todos --

    async fn insert_todo(&self, todo: &NewTodo) -> Result<i64, StoreError>;

    /// Returns the number of rows updated.
    async fn update_todo(&self, changes: &TodoChanges) -> Result<u64, StoreError>;

    async fn get_todo_ownership(&self, id: i64) -> Result<Option<Ownership>, StoreError>;

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError>;

    /// Every public todo, plus the private ones owned by `owner_id` when given.
    async fn list_visible_todos(&self, owner_id: Option<i64>) -> Result<Vec<Todo>, StoreError>;

    // -- Tags --

    async fn insert_tag(&self, name: &str) -> Result<i64, StoreError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError>;
}
