use async_trait::async_trait;
use sqlx::PgPool;

use super::{Store, StoreError};
use crate::models::tag::Tag;
use crate::models::todo::{NewTodo, Ownership, Todo, TodoChanges};
use crate::models::token::{NewToken, TokenRow};
use crate::models::user::User;

const TODO_COLUMNS: &str =
    "id, state, tag_id, owner_id, public, name, due_date, description";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // -- User Operations --

    async fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, name, password_hash FROM users WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // -- Token Operations --

    async fn insert_token(&self, token: &NewToken) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO tokens (type, value, owner_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(token.token_type.code())
        .bind(&token.value)
        .bind(token.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_token_by_value(&self, value: &str) -> Result<Option<TokenRow>, StoreError> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT id, type, value, owner_id FROM tokens WHERE value = $1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_token(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -- Todo Operations --

    async fn insert_todo(&self, todo: &NewTodo) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO todos (state, tag_id, owner_id, public, name, due_date, description)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(todo.state)
        .bind(todo.tag_id)
        .bind(todo.owner_id)
        .bind(todo.public)
        .bind(&todo.name)
        .bind(todo.due_date)
        .bind(&todo.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_todo(&self, changes: &TodoChanges) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"UPDATE todos
               SET state = $2, tag_id = $3, public = $4, name = $5, due_date = $6, description = $7
               WHERE id = $1"#,
        )
        .bind(changes.id)
        .bind(changes.state)
        .bind(changes.tag_id)
        .bind(changes.public)
        .bind(&changes.name)
        .bind(changes.due_date)
        .bind(&changes.description)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn get_todo_ownership(&self, id: i64) -> Result<Option<Ownership>, StoreError> {
        let row = sqlx::query_as::<_, Ownership>(
            "SELECT owner_id, public FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_visible_todos(&self, owner_id: Option<i64>) -> Result<Vec<Todo>, StoreError> {
        // A NULL owner matches nothing, so anonymous callers see public rows only.
        let rows = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE public = TRUE OR owner_id = $1 ORDER BY id ASC",
            TODO_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -- Tag Operations --

    async fn insert_tag(&self, name: &str) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>("INSERT INTO tags (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let rows = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
