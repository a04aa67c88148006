//! Shared handler state.

use std::sync::Arc;

use list_core::ItemStore;
use realtime::StreamingEndpoint;

/// Default number of items rendered by `GET /items`.
pub const DEFAULT_ITEMS_LIMIT: usize = 100;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub endpoint: StreamingEndpoint,
    pub items_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, endpoint: StreamingEndpoint) -> Self {
        Self {
            store,
            endpoint,
            items_limit: DEFAULT_ITEMS_LIMIT,
        }
    }

    pub fn with_items_limit(mut self, limit: usize) -> Self {
        self.items_limit = limit;
        self
    }
}
