use std::sync::Arc;

use socialbook_flux::StateStore;
use tracing::debug;

use crate::state::AppRoute;

/// Navigation side effect.
pub trait Navigator: Send + Sync {
    fn redirect(&self, target: &str);
}

/// Writes the target to `app/route`; the UI follows.
pub struct StateNavigator {
    store: Arc<StateStore>,
}

impl StateNavigator {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }
}

impl Navigator for StateNavigator {
    fn redirect(&self, target: &str) {
        debug!(target, "navigate");
        self.store.set(AppRoute::PATH, AppRoute(target.to_string()));
    }
}
