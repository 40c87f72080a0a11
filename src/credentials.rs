//! Credential store: provisions users and checks name/password pairs.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::models::user::User;
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("user name and password must not be empty")]
    EmptyInput,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Verified against when the user does not exist, so an unknown name costs
/// the same Argon2 work as a wrong password. Default Argon2id parameters;
/// matches no password.
const DUMMY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$dG9kby1nYXRld2F5LWR1bW15LXNhbHQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// `false` for a wrong password and for a malformed stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn Store>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a user. Names are unique; a duplicate surfaces as a store error.
    pub async fn provision(&self, name: &str, password: &str) -> Result<User, CredentialError> {
        if name.is_empty() || password.is_empty() {
            return Err(CredentialError::EmptyInput);
        }
        let password_hash = hash_password(password)?;
        let id = self.store.insert_user(name, &password_hash).await?;
        tracing::info!(user_id = id, user = name, "provisioned user");
        Ok(User {
            id,
            name: name.to_string(),
            password_hash,
        })
    }

    /// The matching user, or `None` when the pair is wrong or either part is empty.
    pub async fn verify(&self, name: &str, password: &str) -> Result<Option<User>, StoreError> {
        if name.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let Some(user) = self.store.find_user_by_name(name).await? else {
            verify_password(password, DUMMY_PHC);
            return Ok(None);
        };
        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = user.id, "password mismatch");
            Ok(None)
        }
    }

    pub async fn has_users(&self) -> Result<bool, StoreError> {
        Ok(self.store.count_users().await? > 0)
    }
}
