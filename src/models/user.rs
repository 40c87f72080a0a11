use sqlx::FromRow;

/// A row from the `users` table.
///
/// `password_hash` is an Argon2 PHC string and never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
}
