use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::store::StateStore;
use crate::topic::PatternTable;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Type-erased handler: (request path, payload, state store).
type ErasedHandler =
    Arc<dyn Fn(String, Arc<dyn Any + Send + Sync>, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Request router: maps path patterns to async handlers.
///
/// Several handlers may match one path; `dispatch` awaits them one after
/// another in registration order.
pub struct Router {
    handlers: PatternTable<ErasedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            handlers: PatternTable::new(),
        }
    }

    /// Register an async handler for a path pattern (`+` and `#` allowed).
    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Arc<dyn Any + Send + Sync>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ErasedHandler = Arc::new(
            move |path: String,
                  payload: Arc<dyn Any + Send + Sync>,
                  store: Arc<StateStore>|
                  -> BoxFuture { Box::pin(handler(path, payload, store)) },
        );
        self.handlers.insert(pattern, handler);
    }

    /// Run every handler matching `path`. No match is a silent no-op.
    pub async fn dispatch(
        &self,
        path: &str,
        payload: Arc<dyn Any + Send + Sync>,
        store: Arc<StateStore>,
    ) {
        let handlers = self.handlers.matching(path);
        if handlers.is_empty() {
            debug!(path, "no handler for request");
            return;
        }
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    /// Whether a handler was registered under exactly `pattern`.
    pub fn has_handler(&self, pattern: &str) -> bool {
        self.handlers.has_pattern(pattern)
    }

    /// Whether any handler would run for `path`.
    pub fn matches(&self, path: &str) -> bool {
        !self.handlers.matching(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    fn test_store() -> Arc<StateStore> {
        Arc::new(StateStore::new())
    }

    #[tokio::test]
    async fn dispatch_runs_exact_handler() {
        let router = Router::new();
        let called = Arc::new(AtomicU64::new(0));
        let c = called.clone();
        router.on("auth/logout", move |_, _, _| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
            }
        });

        router.dispatch("auth/logout", Arc::new(()), test_store()).await;
        router.dispatch("auth/login", Arc::new(()), test_store()).await;
        assert_eq!(called.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn handler_downcasts_payload_and_writes_state() {
        struct ToggleLike {
            post_id: String,
        }

        let router = Router::new();
        router.on("post/toggle-like", |_, payload, store: Arc<StateStore>| async move {
            if let Some(req) = payload.downcast_ref::<ToggleLike>() {
                store.set("last/toggled", req.post_id.clone());
            }
        });

        let store = test_store();
        router
            .dispatch(
                "post/toggle-like",
                Arc::new(ToggleLike { post_id: "p1".into() }),
                store.clone(),
            )
            .await;
        assert_eq!(store.read::<String>("last/toggled"), Some("p1".to_string()));
    }

    #[tokio::test]
    async fn matching_handlers_run_in_registration_order() {
        let router = Router::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (pattern, tag) in [("#", "all"), ("auth/+", "auth"), ("auth/login", "login")] {
            let order = order.clone();
            router.on(pattern, move |_, _, _| {
                let order = order.clone();
                async move {
                    order.lock().unwrap().push(tag);
                }
            });
        }

        router.dispatch("auth/login", Arc::new(()), test_store()).await;
        assert_eq!(*order.lock().unwrap(), vec!["all", "auth", "login"]);
    }

    #[tokio::test]
    async fn handler_receives_concrete_path() {
        let router = Router::new();
        let seen = Arc::new(Mutex::new(String::new()));
        let s = seen.clone();
        router.on("profile/+", move |path, _, _| {
            let s = s.clone();
            async move {
                *s.lock().unwrap() = path;
            }
        });

        router.dispatch("profile/alice", Arc::new(()), test_store()).await;
        assert_eq!(*seen.lock().unwrap(), "profile/alice");
    }

    #[test]
    fn has_handler_and_matches() {
        let router = Router::default();
        router.on("user/+", |_, _, _| async {});

        assert!(router.has_handler("user/+"));
        assert!(!router.has_handler("user/toggle-follow"));
        assert!(router.matches("user/toggle-follow"));
        assert!(!router.matches("post/toggle-like"));
    }
}
