use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::registry::TokenRegistry;
use crate::resources::TodoService;
use crate::store::Store;

/// Shared application state passed to handlers.
///
/// Every service holds the same injected store handle.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: TokenRegistry,
    pub credentials: CredentialStore,
    pub todos: TodoService,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            registry: TokenRegistry::new(store.clone()),
            credentials: CredentialStore::new(store.clone()),
            todos: TodoService::new(store.clone()),
            store,
            config,
        }
    }

    /// Seed an empty store with the configured admin user and default tag.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        if !self.credentials.has_users().await? {
            let admin = self
                .credentials
                .provision(&self.config.admin_user, &self.config.admin_password)
                .await
                .context("failed to create bootstrap admin user")?;
            tracing::info!(user_id = admin.id, user = %admin.name, "created bootstrap admin user");
        }

        if self.todos.list_tags().await?.is_empty() {
            let tag = self
                .todos
                .add_tag(&self.config.default_tag)
                .await
                .context("failed to create default tag")?;
            tracing::info!(tag_id = tag.id, tag = %tag.name, "created default tag");
        }

        Ok(())
    }
}
