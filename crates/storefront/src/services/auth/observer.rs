//! Observable "current session" for one shopper.
//!
//! Listeners are notified synchronously on every [`SessionObserver::publish`]
//! and once immediately when they subscribe. Dropping (or calling
//! [`Subscription::unsubscribe`] on) the returned handle detaches the
//! listener.
//!
//! Deliveries are serialized: concurrent publishes reach every listener in
//! the order they updated the current user, so the last value a listener
//! saw always equals [`SessionObserver::current`]. A listener must not
//! publish or subscribe on the observer that is calling it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::models::User;

type Listener = Arc<dyn Fn(Option<&User>) + Send + Sync>;

#[derive(Default)]
struct ObserverInner {
    current: Option<User>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Publishes session changes to subscribed listeners.
#[derive(Clone, Default)]
pub struct SessionObserver {
    inner: Arc<Mutex<ObserverInner>>,
    // Held from updating `current` until every listener has run.
    delivery: Arc<Mutex<()>>,
}

impl SessionObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<User> {
        self.lock().current.clone()
    }

    /// Register `listener`; it is invoked right away with the current user.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&User>) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let _delivery = self.deliver();
        let (id, current) = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.current.clone())
        };
        listener(current.as_ref());

        Subscription {
            observer: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Replace the current session and notify every listener.
    pub fn publish(&self, user: Option<User>) {
        let _delivery = self.deliver();
        let listeners: Vec<Listener> = {
            let mut inner = self.lock();
            inner.current.clone_from(&user);
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener(user.as_ref());
        }
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn deliver(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, ObserverInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle that keeps a listener attached.
#[must_use = "dropping a subscription detaches its listener"]
pub struct Subscription {
    observer: Weak<Mutex<ObserverInner>>,
    id: u64,
}

impl Subscription {
    /// Detach the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.observer.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
