use std::sync::Arc;

use checkin_core::store::ResponseStore;

/// Shared state for the HTTP layer. Handlers only read the store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ResponseStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ResponseStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ResponseStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
