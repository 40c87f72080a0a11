//! Token registry: mints, resolves and revokes bearer tokens.
//!
//! Values are 32 characters drawn from `[A-Za-z0-9]` using the OS CSPRNG.
//! `rand`'s `Alphanumeric` distribution rejects out-of-range samples rather
//! than reducing modulo 62, so every character is uniform.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

use crate::models::token::{NewToken, Resolution, Token, TokenType};
use crate::store::{Store, StoreError};

pub const TOKEN_LENGTH: usize = 32;

/// Fresh random token value.
pub fn generate_value() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Clone)]
pub struct TokenRegistry {
    store: Arc<dyn Store>,
}

impl TokenRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Persist a new token of `token_type` owned by `owner_id`.
    ///
    /// The insert payload has no id field, so minting can never overwrite an
    /// existing row.
    pub async fn mint(&self, owner_id: i64, token_type: TokenType) -> Result<Token, StoreError> {
        let new_token = NewToken {
            token_type,
            value: generate_value(),
            owner_id,
        };
        let id = self.store.insert_token(&new_token).await?;
        tracing::info!(token_id = id, owner_id, %token_type, "minted token");
        Ok(Token {
            id,
            token_type,
            value: new_token.value,
            owner_id,
        })
    }

    /// Look up a presented value. Empty and unknown values are `Invalid`;
    /// only a storage failure is an error.
    pub async fn resolve(&self, value: &str) -> Result<Resolution, StoreError> {
        if value.is_empty() {
            return Ok(Resolution::Invalid);
        }

        let Some(row) = self.store.find_token_by_value(value).await? else {
            tracing::debug!("token did not resolve");
            return Ok(Resolution::Invalid);
        };

        let id = row.id;
        match Token::try_from(row) {
            Ok(token) => {
                tracing::debug!(token_id = token.id, owner_id = token.owner_id, "resolved token");
                Ok(Resolution::Resolved(token))
            }
            Err(code) => {
                tracing::warn!(token_id = id, code, "token row has unknown type; treating as invalid");
                Ok(Resolution::Invalid)
            }
        }
    }

    /// Delete by id. `true` when exactly one row was removed.
    pub async fn revoke(&self, token_id: i64) -> Result<bool, StoreError> {
        let removed = self.store.delete_token(token_id).await?;
        if removed == 1 {
            tracing::info!(token_id, "revoked token");
        }
        Ok(removed == 1)
    }
}
