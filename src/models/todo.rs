use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A full row from the `todos` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub state: i32,
    pub tag_id: Option<i64>,
    pub owner_id: i64,
    pub public: bool,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub description: String,
}

/// Projection read before authorization: just enough to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Ownership {
    pub owner_id: i64,
    pub public: bool,
}

/// Client-supplied todo fields.
///
/// `id` absent or non-positive means "new". `owner_id` is accepted on the
/// wire but never trusted: the owner always comes from the authorizing token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TodoDraft {
    pub id: Option<i64>,
    pub state: i32,
    pub tag_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub public: bool,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl TodoDraft {
    /// The positive id this draft refers to, if any.
    pub fn existing_id(&self) -> Option<i64> {
        self.id.filter(|id| *id > 0)
    }
}

/// Insert payload for the `todos` table.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub state: i32,
    pub tag_id: Option<i64>,
    pub owner_id: i64,
    pub public: bool,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub description: String,
}

/// The mutable columns of an existing todo. Ownership is not among them.
#[derive(Debug, Clone)]
pub struct TodoChanges {
    pub id: i64,
    pub state: i32,
    pub tag_id: Option<i64>,
    pub public: bool,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub description: String,
}
