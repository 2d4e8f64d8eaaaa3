use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::topic::PatternTable;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Per-path state store with pattern-routed change notifications.
///
/// - `set(path, value)` stores a value and notifies matching subscribers.
/// - `get(path)` / `read::<T>(path)` read the current value.
/// - `scan(prefix)` lists all children under a prefix path.
/// - `subscribe(pattern, handler)` / `unsubscribe(pattern, id)`.
///
/// Subscribers run synchronously on the caller of `set`, after the value
/// lock is released, so a handler may read the store.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: PatternTable<HandlerEntry>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: PatternTable::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn values(&self) -> RwLockReadGuard<'_, BTreeMap<String, StateValue>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn values_mut(&self) -> RwLockWriteGuard<'_, BTreeMap<String, StateValue>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Set a typed value at `path` and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    /// Set a pre-built value at `path` and notify matching subscribers.
    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values_mut().insert(path.to_string(), value.clone());
        self.notify(path, &value);
    }

    fn notify(&self, path: &str, value: &StateValue) {
        for entry in self.handlers.matching(path) {
            (entry.handler)(path, value);
        }
    }

    /// Current value at `path` (Arc clone).
    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values().get(path).cloned()
    }

    /// Current value at `path` cloned out as `T`.
    ///
    /// `None` when nothing is stored or the stored type is not `T`.
    pub fn read<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Read-modify-write of a typed value.
    ///
    /// `f` receives the current value (if any and of type `T`) and returns
    /// the replacement. The new value is published like `set`.
    pub fn update<T, F>(&self, path: &str, f: F) -> T
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce(Option<T>) -> T,
    {
        let next = {
            let mut values = self.values_mut();
            let current = values.get(path).and_then(|v| v.cloned::<T>());
            let next = f(current);
            values.insert(path.to_string(), StateValue::new(next.clone()));
            next
        };
        if let Some(value) = self.get(path) {
            self.notify(path, &value);
        }
        next
    }

    /// Remove the value at `path`. Does NOT notify subscribers.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values_mut().remove(path)
    }

    /// Remove every value under `{prefix}/`. Returns how many were dropped.
    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let scan_prefix = format!("{}/", prefix);
        let mut values = self.values_mut();
        let before = values.len();
        values.retain(|k, _| !k.starts_with(&scan_prefix));
        before - values.len()
    }

    /// All entries whose path starts with `{prefix}/`, ordered by path.
    ///
    /// The exact `prefix` path itself is not included.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let scan_prefix = format!("{}/", prefix);
        self.values()
            .range(scan_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&scan_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `handler` for every `set` on a path matching `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            HandlerEntry {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove(pattern, |entry| entry.id == id);
    }

    /// All paths and values, ordered by path.
    pub fn snapshot(&self) -> Vec<(String, StateValue)> {
        self.values()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn paths(&self) -> Vec<String> {
        self.values().keys().cloned().collect()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
