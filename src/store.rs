//! Observable value slots shared between the dashboard's views.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::models::{DashboardInfo, PeerBook};

pub type DashboardStore = Store<DashboardInfo>;
pub type PeerStore = Store<PeerBook>;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// A single value with synchronous change notification.
///
/// Clones share the same slot. Updates are whole-value replacements.
pub struct Store<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Default + Clone> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

fn lock<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: initial,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.slot).value.clone()
    }

    /// Replaces the value and notifies every current subscriber before returning.
    pub fn set(&self, value: T) {
        let subscribers: Vec<Callback<T>> = {
            let mut slot = lock(&self.slot);
            slot.value = value.clone();
            slot.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };

        for callback in subscribers {
            callback(&value);
        }
    }

    /// The callback only sees replacements made after this call.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut slot = lock(&self.slot);
        let id = slot.next_id;
        slot.next_id += 1;
        slot.subscribers.push((id, Arc::new(callback)));

        Subscription {
            id,
            slot: Arc::downgrade(&self.slot),
        }
    }
}

#[must_use = "dropping a subscription keeps the callback registered"]
pub struct Subscription<T> {
    id: u64,
    slot: Weak<Mutex<Slot<T>>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {
        if let Some(slot) = self.slot.upgrade() {
            lock(&slot).subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
