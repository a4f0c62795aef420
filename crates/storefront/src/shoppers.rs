//! Registry of per-shopper state.
//!
//! Every browser session carries a [`ShopperId`]. The registry maps it to a
//! loaded [`StateStore`] plus the shopper's [`SessionObserver`]; the store
//! subscribes to the observer once, when the shopper is first loaded, so
//! sign-in and sign-out flow into the cached user automatically.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::future::Cache;

use crate::models::{ShopperId, User};
use crate::services::auth::{SessionObserver, Subscription};
use crate::store::{FileStorage, MemoryStorage, StateStorage, StateStore};

/// Shoppers kept loaded at once.
const MAX_LOADED_SHOPPERS: u64 = 10_000;

/// Matches the session cookie's inactivity expiry.
const SHOPPER_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// State store over whichever backend the registry was configured with.
pub type ShopperStore = StateStore<Box<dyn StateStorage + Send>>;

/// Where shopper state is persisted.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Kept only while the shopper stays loaded.
    Memory,
    /// One subdirectory per shopper under this root.
    Directory(PathBuf),
}

/// A loaded shopper.
pub struct Shopper {
    id: ShopperId,
    store: Arc<Mutex<ShopperStore>>,
    session: SessionObserver,
    _subscription: Subscription,
}

impl Shopper {
    fn load(id: ShopperId, storage: Box<dyn StateStorage + Send>) -> Self {
        let store = StateStore::open(storage);
        let session = SessionObserver::new();
        // Resume the session the shopper last had.
        if let Some(user) = store.user().cloned() {
            session.publish(Some(user));
        }

        let store = Arc::new(Mutex::new(store));
        let listener_store = Arc::clone(&store);
        let subscription = session.subscribe(move |user: Option<&User>| {
            let mut store = listener_store
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            store.set_user(user.cloned());
        });

        Self {
            id,
            store,
            session,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ShopperId {
        self.id
    }

    /// Run `f` with exclusive access to the shopper's store.
    ///
    /// The lock is released when `f` returns; never call this across an
    /// `.await` or from inside a session listener.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut ShopperStore) -> R) -> R {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// The shopper's session.
    #[must_use]
    pub const fn session(&self) -> &SessionObserver {
        &self.session
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.current()
    }
}

/// Shared, cheaply cloneable shopper registry.
#[derive(Clone)]
pub struct ShopperRegistry {
    shoppers: Cache<ShopperId, Arc<Shopper>>,
    backend: StorageBackend,
}

impl ShopperRegistry {
    #[must_use]
    pub fn new(backend: StorageBackend) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(MAX_LOADED_SHOPPERS)
            .time_to_idle(SHOPPER_IDLE_TIMEOUT)
            .build();
        Self { shoppers, backend }
    }

    /// The shopper for `id`, loading persisted state on first access.
    pub async fn get_or_load(&self, id: ShopperId) -> Arc<Shopper> {
        self.shoppers
            .get_with(id, async move { Arc::new(Shopper::load(id, self.open_storage(id))) })
            .await
    }

    fn open_storage(&self, id: ShopperId) -> Box<dyn StateStorage + Send> {
        match &self.backend {
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
            StorageBackend::Directory(root) => match FileStorage::open(root.join(id.to_string())) {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    tracing::warn!(shopper_id = %id, error = %e, "falling back to in-memory state");
                    Box::new(MemoryStorage::new())
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use satchel_core::{Brand, Category, ProductId};

    use super::*;
    use crate::catalog::tests::product;

    fn user() -> User {
        User::from_provider("uid-1", Some("Ada"), Some("ada@example.com"))
    }

    #[tokio::test]
    async fn test_same_id_returns_same_shopper() {
        let registry = ShopperRegistry::new(StorageBackend::Memory);
        let id = ShopperId::generate();

        let first = registry.get_or_load(id).await;
        first.with_store(|store| {
            store.add_to_cart(&product("a", Category::Tote, Brand::ChicVogue, 1_000));
        });
        let second = registry.get_or_load(id).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.with_store(|store| store.cart_item_count()), 1);
    }

    #[tokio::test]
    async fn test_shoppers_are_isolated() {
        let registry = ShopperRegistry::new(StorageBackend::Memory);
        let a = registry.get_or_load(ShopperId::generate()).await;
        let b = registry.get_or_load(ShopperId::generate()).await;

        a.with_store(|store| store.add_to_history(&ProductId::new("1")));
        assert!(b.with_store(|store| store.history().is_empty()));
    }

    #[tokio::test]
    async fn test_session_changes_reach_store() {
        let registry = ShopperRegistry::new(StorageBackend::Memory);
        let shopper = registry.get_or_load(ShopperId::generate()).await;

        shopper.session().publish(Some(user()));
        assert_eq!(shopper.with_store(|store| store.user().cloned()), Some(user()));

        shopper.session().publish(None);
        assert!(shopper.with_store(|store| store.user().is_none()));
        assert!(shopper.user().is_none());
    }

    #[tokio::test]
    async fn test_directory_backend_persists_and_resumes_session() {
        let dir = tempfile::tempdir().unwrap();
        let id = ShopperId::generate();
        {
            let registry = ShopperRegistry::new(StorageBackend::Directory(dir.path().into()));
            let shopper = registry.get_or_load(id).await;
            shopper.with_store(|store| store.add_to_history(&ProductId::new("7")));
            shopper.session().publish(Some(user()));
        }

        let registry = ShopperRegistry::new(StorageBackend::Directory(dir.path().into()));
        let shopper = registry.get_or_load(id).await;
        assert_eq!(shopper.with_store(|store| store.history().joined()), "7");
        assert_eq!(shopper.user(), Some(user()));
        assert!(dir.path().join(id.to_string()).join("browsingHistory.json").exists());
    }
}
