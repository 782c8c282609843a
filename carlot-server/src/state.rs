//! Application state shared across handlers

use std::sync::Arc;

use crate::db::{CarStore, SessionSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Box<dyn CarStore>,
    settings: SessionSettings,
}

impl AppState {
    pub fn new(store: impl CarStore, settings: SessionSettings) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Box::new(store),
                settings,
            }),
        }
    }

    pub fn store(&self) -> &dyn CarStore {
        self.inner.store.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }
}
