// Application state (AppState)

use crate::core::config::Config;
use crate::stores::UserStore;
use std::sync::Arc;

/// Shared application state
///
/// Handed to every request handler. The store is the only mutable shared
/// resource and does its own synchronization.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for registrations (memory or database)
    pub store: Arc<dyn UserStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
