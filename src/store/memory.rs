//! In-process store with the same semantics as the Postgres schema:
//! auto-incrementing ids starting at 1, unique `users.name` and
//! `tokens.value`. Backs `serve --in-memory` and the test suite.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::models::tag::Tag;
use crate::models::todo::{NewTodo, Ownership, Todo, TodoChanges};
use crate::models::token::{NewToken, TokenRow};
use crate::models::user::User;

/// One table: rows keyed by id plus its sequence.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, build(id));
        id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    tokens: Table<TokenRow>,
    todos: Table<Todo>,
    tags: Table<Tag>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_user(&self, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        let mut db = self.inner.write().await;
        if db.users.rows.values().any(|u| u.name == name) {
            return Err(StoreError::Constraint(format!(
                "duplicate user name '{}'",
                name
            )));
        }
        Ok(db.users.insert_with(|id| User {
            id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
        }))
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let db = self.inner.read().await;
        Ok(db.users.rows.values().find(|u| u.name == name).cloned())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.users.rows.len() as i64)
    }

    async fn insert_token(&self, token: &NewToken) -> Result<i64, StoreError> {
        let mut db = self.inner.write().await;
        if db.tokens.rows.values().any(|t| t.value == token.value) {
            // never echo the value itself
            return Err(StoreError::Constraint("duplicate token value".into()));
        }
        Ok(db.tokens.insert_with(|id| TokenRow {
            id,
            token_type: token.token_type.code(),
            value: token.value.clone(),
            owner_id: token.owner_id,
        }))
    }

    async fn find_token_by_value(&self, value: &str) -> Result<Option<TokenRow>, StoreError> {
        let db = self.inner.read().await;
        Ok(db.tokens.rows.values().find(|t| t.value == value).cloned())
    }

    async fn delete_token(&self, id: i64) -> Result<u64, StoreError> {
        let mut db = self.inner.write().await;
        Ok(db.tokens.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn insert_todo(&self, todo: &NewTodo) -> Result<i64, StoreError> {
        let mut db = self.inner.write().await;
        Ok(db.todos.insert_with(|id| Todo {
            id,
            state: todo.state,
            tag_id: todo.tag_id,
            owner_id: todo.owner_id,
            public: todo.public,
            name: todo.name.clone(),
            due_date: todo.due_date,
            description: todo.description.clone(),
        }))
    }

    async fn update_todo(&self, changes: &TodoChanges) -> Result<u64, StoreError> {
        let mut db = self.inner.write().await;
        let Some(row) = db.todos.rows.get_mut(&changes.id) else {
            return Ok(0);
        };
        row.state = changes.state;
        row.tag_id = changes.tag_id;
        row.public = changes.public;
        row.name = changes.name.clone();
        row.due_date = changes.due_date;
        row.description = changes.description.clone();
        Ok(1)
    }

    async fn get_todo_ownership(&self, id: i64) -> Result<Option<Ownership>, StoreError> {
        let db = self.inner.read().await;
        Ok(db.todos.rows.get(&id).map(|t| Ownership {
            owner_id: t.owner_id,
            public: t.public,
        }))
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.inner.read().await.todos.rows.get(&id).cloned())
    }

    async fn delete_todo(&self, id: i64) -> Result<u64, StoreError> {
        let mut db = self.inner.write().await;
        Ok(db.todos.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn list_visible_todos(&self, owner_id: Option<i64>) -> Result<Vec<Todo>, StoreError> {
        let db = self.inner.read().await;
        Ok(db
            .todos
            .rows
            .values()
            .filter(|t| t.public || Some(t.owner_id) == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_tag(&self, name: &str) -> Result<i64, StoreError> {
        let mut db = self.inner.write().await;
        Ok(db.tags.insert_with(|id| Tag {
            id,
            name: name.to_string(),
        }))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.inner.read().await.tags.rows.values().cloned().collect())
    }
}
