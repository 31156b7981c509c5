//! Global Session Store
//!
//! Holds the signed-in user and the working tenant. Only the tenant id is
//! persisted; after a restart the store knows *which* tenant was active but
//! not its details, so pages re-fetch it.
//!
//! Every mutation publishes a [`StoreEvent`] carrying a full snapshot on a
//! broadcast channel. Consumers call [`Store::subscribe`]; there is no other
//! propagation path.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::api::Tenant;
use crate::auth::User;
use crate::storage::{KeyValueStorage, ACTIVE_TENANT_ID_KEY};

/// Capacity of the event channel; slow subscribers lag rather than block
const EVENT_CAPACITY: usize = 64;

/// Snapshot of the session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: Option<User>,
    pub active_tenant: Option<Tenant>,
    pub active_tenant_id: Option<String>,
}

/// Which part of the state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEventKind {
    AuthChanged,
    TenantChanged,
}

impl StoreEventKind {
    /// Event name as exposed to external listeners
    pub fn name(self) -> &'static str {
        match self {
            StoreEventKind::AuthChanged => "app:auth-changed",
            StoreEventKind::TenantChanged => "app:tenant-changed",
        }
    }
}

/// Change notification with the state after the change
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub kind: StoreEventKind,
    pub snapshot: AppState,
}

struct StoreInner {
    state: RwLock<AppState>,
    storage: Arc<dyn KeyValueStorage>,
    events: broadcast::Sender<StoreEvent>,
}

/// Shared handle to the session store
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create the store and hydrate the persisted tenant id
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let active_tenant_id = storage
            .get_item(ACTIVE_TENANT_ID_KEY)
            .filter(|id| !id.is_empty());

        if let Some(id) = &active_tenant_id {
            tracing::debug!(tenant_id = %id, "Hydrated active tenant id");
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(AppState {
                    user: None,
                    active_tenant: None,
                    active_tenant_id,
                }),
                storage,
                events,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn active_tenant(&self) -> Option<Tenant> {
        self.read().active_tenant.clone()
    }

    pub fn active_tenant_id(&self) -> Option<String> {
        self.read().active_tenant_id.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    pub fn snapshot(&self) -> AppState {
        self.read().clone()
    }

    /// Receive every subsequent change
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Set or clear the signed-in user
    ///
    /// Clearing the user also clears the tenant context.
    pub fn set_user(&self, user: Option<User>) {
        let signed_out = user.is_none();
        self.write().user = user;

        if signed_out {
            self.set_active_tenant(None);
        }

        self.notify(StoreEventKind::AuthChanged);
    }

    /// Select a tenant, or clear the selection with `None`
    pub fn set_active_tenant(&self, tenant: Option<Tenant>) {
        {
            let mut state = self.write();
            match &tenant {
                Some(t) => {
                    state.active_tenant_id = Some(t.id.clone());
                    state.active_tenant = tenant.clone();
                }
                None => {
                    state.active_tenant = None;
                    state.active_tenant_id = None;
                }
            }
        }

        match &tenant {
            Some(t) => self.persist_tenant_id(Some(&t.id)),
            None => self.persist_tenant_id(None),
        }

        self.notify(StoreEventKind::TenantChanged);
    }

    /// Select a tenant by id only
    ///
    /// A cached tenant object for a different id is dropped so the
    /// workspace page fetches the right one.
    pub fn set_active_tenant_id(&self, tenant_id: &str) {
        {
            let mut state = self.write();
            if state
                .active_tenant
                .as_ref()
                .is_some_and(|t| t.id != tenant_id)
            {
                state.active_tenant = None;
            }
            state.active_tenant_id = Some(tenant_id.to_string());
        }

        self.persist_tenant_id(Some(tenant_id));
        self.notify(StoreEventKind::TenantChanged);
    }

    /// Reset everything, persisted tenant id included
    pub fn clear(&self) {
        *self.write() = AppState::default();
        self.persist_tenant_id(None);

        self.notify(StoreEventKind::AuthChanged);
        self.notify(StoreEventKind::TenantChanged);
    }

    fn persist_tenant_id(&self, tenant_id: Option<&str>) {
        let result = match tenant_id {
            Some(id) => self.inner.storage.set_item(ACTIVE_TENANT_ID_KEY, id),
            None => self.inner.storage.remove_item(ACTIVE_TENANT_ID_KEY),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist active tenant id");
        }
    }

    fn notify(&self, kind: StoreEventKind) {
        let event = StoreEvent {
            kind,
            snapshot: self.snapshot(),
        };
        // No receivers is fine
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    fn tenant(id: &str) -> Tenant {
        Tenant {
            id: id.to_string(),
            name: format!("Tenant {}", id),
            created_at: Utc::now(),
        }
    }

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn store_with(storage: Arc<MemoryStorage>) -> Store {
        Store::new(storage)
    }

    #[test]
    fn test_hydrates_tenant_id_only() {
        let storage = Arc::new(MemoryStorage::with_items([(ACTIVE_TENANT_ID_KEY, "t-7")]));
        let store = store_with(storage);

        assert_eq!(store.active_tenant_id().as_deref(), Some("t-7"));
        assert_eq!(store.active_tenant(), None);
        assert_eq!(store.user(), None);
    }

    #[test]
    fn test_set_active_tenant_persists_id() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage));

        store.set_active_tenant(Some(tenant("t-1")));

        assert_eq!(store.active_tenant_id().as_deref(), Some("t-1"));
        assert_eq!(store.active_tenant().map(|t| t.id), Some("t-1".to_string()));
        assert_eq!(storage.get_item(ACTIVE_TENANT_ID_KEY).as_deref(), Some("t-1"));
    }

    #[test]
    fn test_clearing_active_tenant_clears_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage));
        store.set_active_tenant(Some(tenant("t-1")));

        store.set_active_tenant(None);

        assert_eq!(store.active_tenant(), None);
        assert_eq!(store.active_tenant_id(), None);
        assert_eq!(storage.get_item(ACTIVE_TENANT_ID_KEY), None);
    }

    #[test]
    fn test_sign_out_cascades_to_tenant() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage));
        store.set_user(Some(user()));
        store.set_active_tenant(Some(tenant("t-1")));

        store.set_user(None);

        assert_eq!(store.snapshot(), AppState::default());
        assert_eq!(storage.get_item(ACTIVE_TENANT_ID_KEY), None);
    }

    #[test]
    fn test_set_active_tenant_id_drops_stale_object() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        store.set_active_tenant(Some(tenant("t-1")));

        store.set_active_tenant_id("t-1");
        assert!(store.active_tenant().is_some());

        store.set_active_tenant_id("t-2");
        assert_eq!(store.active_tenant(), None);
        assert_eq!(store.active_tenant_id().as_deref(), Some("t-2"));
    }

    #[test]
    fn test_clear_resets_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(Arc::clone(&storage));
        store.set_user(Some(user()));
        store.set_active_tenant_id("t-3");

        store.clear();

        assert_eq!(store.snapshot(), AppState::default());
        assert_eq!(storage.get_item(ACTIVE_TENANT_ID_KEY), None);
    }

    #[tokio::test]
    async fn test_events_carry_snapshots() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let mut rx = store.subscribe();

        store.set_user(Some(user()));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, StoreEventKind::AuthChanged);
        assert_eq!(event.snapshot.user, Some(user()));

        store.set_user(None);
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, StoreEventKind::TenantChanged);
        assert_eq!(second.kind, StoreEventKind::AuthChanged);
        assert_eq!(second.snapshot, AppState::default());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(StoreEventKind::AuthChanged.name(), "app:auth-changed");
        assert_eq!(StoreEventKind::TenantChanged.name(), "app:tenant-changed");
    }
}
