use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Tags are global, not owner-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
