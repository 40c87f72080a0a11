//! Resource service for todos and tags.
//!
//! Each method performs exactly one store call for an intent that the policy
//! has already approved. Input shape is validated here; permissions are not.

use std::sync::Arc;

use thiserror::Error;

use crate::models::tag::Tag;
use crate::models::todo::{NewTodo, Ownership, Todo, TodoChanges, TodoDraft};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn Store>,
}

impl TodoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Insert a new todo owned by `owner_id`. Returns the assigned id.
    pub async fn create(&self, draft: &TodoDraft, owner_id: i64) -> Result<i64, ResourceError> {
        if draft.existing_id().is_some() {
            return Err(ResourceError::Rejected("new todo must not carry an id"));
        }
        if draft.name.is_empty() {
            return Err(ResourceError::Rejected("todo name is required"));
        }
        let new_todo = NewTodo {
            state: draft.state,
            tag_id: draft.tag_id,
            owner_id,
            public: draft.public,
            name: draft.name.clone(),
            due_date: draft.due_date,
            description: draft.description.clone(),
        };
        let id = self.store.insert_todo(&new_todo).await?;
        tracing::info!(todo_id = id, owner_id, "created todo");
        Ok(id)
    }

    /// Overwrite the mutable fields of an existing todo. `Ok(false)` when the
    /// row no longer exists. The owner is never changed.
    pub async fn update(&self, draft: &TodoDraft) -> Result<bool, ResourceError> {
        let id = draft
            .existing_id()
            .ok_or(ResourceError::Rejected("todo id is required"))?;
        if draft.name.is_empty() {
            return Err(ResourceError::Rejected("todo name is required"));
        }
        let changes = TodoChanges {
            id,
            state: draft.state,
            tag_id: draft.tag_id,
            public: draft.public,
            name: draft.name.clone(),
            due_date: draft.due_date,
            description: draft.description.clone(),
        };
        let updated = self.store.update_todo(&changes).await? == 1;
        if updated {
            tracing::info!(todo_id = id, "updated todo");
        }
        Ok(updated)
    }

    /// Owner and visibility only; read before any permission is known.
    pub async fn fetch_ownership(&self, id: i64) -> Result<Option<Ownership>, StoreError> {
        if id < 1 {
            return Ok(None);
        }
        self.store.get_todo_ownership(id).await
    }

    /// The full record; call only once access is granted.
    pub async fn fetch_full(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        if id < 1 {
            return Ok(None);
        }
        self.store.get_todo(id).await
    }

    pub async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self.store.delete_todo(id).await? == 1;
        if removed {
            tracing::info!(todo_id = id, "removed todo");
        }
        Ok(removed)
    }

    /// Public todos plus, when `owner_id` is given, that owner's private ones.
    pub async fn list_visible(&self, owner_id: Option<i64>) -> Result<Vec<Todo>, StoreError> {
        self.store.list_visible_todos(owner_id).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        self.store.list_tags().await
    }

    pub async fn add_tag(&self, name: &str) -> Result<Tag, ResourceError> {
        if name.is_empty() {
            return Err(ResourceError::Rejected("tag name is required"));
        }
        let id = self.store.insert_tag(name).await?;
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryStore::new()))
    }

    fn draft(name: &str, public: bool) -> TodoDraft {
        TodoDraft {
            name: name.into(),
            public,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_forces_owner_and_assigns_id() {
        let svc = service();
        let input = TodoDraft {
            state: 2,
            tag_id: Some(1),
            owner_id: Some(99),
            public: true,
            name: "buy milk".into(),
            due_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
            description: "2 litres".into(),
            ..Default::default()
        };
        let id = svc.create(&input, 1).await.unwrap();
        assert!(id > 0);

        let todo = svc.fetch_full(id).await.unwrap().unwrap();
        assert_eq!(
            todo,
            Todo {
                id,
                state: 2,
                tag_id: Some(1),
                owner_id: 1,
                public: true,
                name: "buy milk".into(),
                due_date: input.due_date,
                description: "2 litres".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_rejects_id_and_empty_name() {
        let svc = service();
        let with_id = TodoDraft {
            id: Some(3),
            ..draft("x", false)
        };
        assert!(matches!(
            svc.create(&with_id, 1).await,
            Err(ResourceError::Rejected(_))
        ));
        assert!(matches!(
            svc.create(&draft("", false), 1).await,
            Err(ResourceError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_owner() {
        let svc = service();
        let id = svc.create(&draft("old", false), 1).await.unwrap();
        let change = TodoDraft {
            id: Some(id),
            owner_id: Some(2),
            ..draft("new", true)
        };
        assert!(svc.update(&change).await.unwrap());
        let todo = svc.fetch_full(id).await.unwrap().unwrap();
        assert_eq!(todo.name, "new");
        assert!(todo.public);
        assert_eq!(todo.owner_id, 1);
    }

    #[tokio::test]
    async fn test_update_requires_id_and_name() {
        let svc = service();
        assert!(matches!(
            svc.update(&draft("x", false)).await,
            Err(ResourceError::Rejected(_))
        ));
        let nameless = TodoDraft {
            id: Some(1),
            ..draft("", false)
        };
        assert!(matches!(
            svc.update(&nameless).await,
            Err(ResourceError::Rejected(_))
        ));
        let missing = TodoDraft {
            id: Some(77),
            ..draft("x", false)
        };
        assert!(!svc.update(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_ownership_projection() {
        let svc = service();
        let id = svc.create(&draft("p", true), 4).await.unwrap();
        assert_eq!(
            svc.fetch_ownership(id).await.unwrap(),
            Some(Ownership {
                owner_id: 4,
                public: true
            })
        );
        assert_eq!(svc.fetch_ownership(id + 1).await.unwrap(), None);
        assert_eq!(svc.fetch_ownership(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_visible_filters_private_rows() {
        let svc = service();
        let a_pub = svc.create(&draft("a-public", true), 1).await.unwrap();
        let a_priv = svc.create(&draft("a-private", false), 1).await.unwrap();
        let b_pub = svc.create(&draft("b-public", true), 2).await.unwrap();
        let b_priv = svc.create(&draft("b-private", false), 2).await.unwrap();

        let ids = |todos: Vec<Todo>| todos.into_iter().map(|t| t.id).collect::<Vec<_>>();

        assert_eq!(ids(svc.list_visible(None).await.unwrap()), vec![a_pub, b_pub]);
        assert_eq!(
            ids(svc.list_visible(Some(1)).await.unwrap()),
            vec![a_pub, a_priv, b_pub]
        );
        assert_eq!(
            ids(svc.list_visible(Some(2)).await.unwrap()),
            vec![a_pub, b_pub, b_priv]
        );
    }

    #[tokio::test]
    async fn test_remove_then_fetch_is_not_found() {
        let svc = service();
        let id = svc.create(&draft("gone", false), 1).await.unwrap();
        assert!(svc.remove(id).await.unwrap());
        assert!(!svc.remove(id).await.unwrap());
        assert_eq!(svc.fetch_full(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tags() {
        let svc = service();
        assert!(svc.list_tags().await.unwrap().is_empty());
        let tag = svc.add_tag("Unsorted").await.unwrap();
        assert_eq!(tag.id, 1);
        assert_eq!(svc.list_tags().await.unwrap(), vec![tag]);
        assert!(svc.add_tag("").await.is_err());
    }
}
