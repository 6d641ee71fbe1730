use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::session::EditSession;
use crate::store::{DocumentStore, OwnerKey};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub sessions: SessionRegistry,
    /// `None` when no provider key is configured; AI routes answer 503.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    pub fn new(store: DocumentStore, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            store,
            sessions: SessionRegistry::default(),
            generator,
        }
    }

    pub fn generator(&self) -> Result<&dyn TextGenerator, AppError> {
        self.generator.as_deref().ok_or(AppError::AiUnavailable)
    }
}

/// One edit session per owner. Handlers hold the owner's lock for the whole
/// request, so two saves for the same owner never overlap.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<OwnerKey, Arc<Mutex<EditSession>>>>>,
}

impl SessionRegistry {
    /// Returns the owner's session, creating it on first use.
    pub async fn for_owner(&self, owner: &OwnerKey) -> Arc<Mutex<EditSession>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(owner.clone()).or_default())
    }

    /// Returns the owner's session only if one exists. Read paths use this so
    /// arbitrary owner strings never allocate a session.
    pub async fn get(&self, owner: &OwnerKey) -> Option<Arc<Mutex<EditSession>>> {
        self.sessions.lock().await.get(owner).cloned()
    }

    /// Drops the owner's session when it has no active document and no
    /// request holds it. Callers must release their own handle first.
    pub async fn release_if_idle(&self, owner: &OwnerKey) {
        let mut sessions = self.sessions.lock().await;
        let idle = sessions.get(owner).is_some_and(|session| {
            Arc::strong_count(session) == 1
                && session
                    .try_lock()
                    .is_ok_and(|session| session.active().is_none())
        });
        if idle {
            sessions.remove(owner);
            debug!("Released idle session for owner {owner}");
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::resume::ResumeRecord;

    #[tokio::test]
    async fn test_registry_returns_same_session_per_owner() {
        let registry = SessionRegistry::default();
        let alice = OwnerKey::parse(Some("alice")).unwrap();
        let bob = OwnerKey::parse(Some("bob")).unwrap();

        let first = registry.for_owner(&alice).await;
        let again = registry.for_owner(&alice).await;
        let other = registry.for_owner(&bob).await;

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn test_get_does_not_create_sessions() {
        let registry = SessionRegistry::default();
        let alice = OwnerKey::parse(Some("alice")).unwrap();

        assert!(registry.get(&alice).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_release_drops_only_idle_unheld_sessions() {
        let registry = SessionRegistry::default();
        let alice = OwnerKey::parse(Some("alice")).unwrap();

        let held = registry.for_owner(&alice).await;
        registry.release_if_idle(&alice).await;
        assert_eq!(registry.len().await, 1);

        let draft = ResumeRecord::blank(Uuid::new_v4(), Utc::now());
        let draft_id = draft.id;
        held.lock().await.open_unsaved(draft);
        drop(held);
        registry.release_if_idle(&alice).await;
        assert_eq!(registry.len().await, 1);

        let session = registry.get(&alice).await.unwrap();
        session.lock().await.forget(draft_id);
        drop(session);
        registry.release_if_idle(&alice).await;
        assert_eq!(registry.len().await, 0);
    }
}
