//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - Server configuration
//! - The provider registry and the built-in in-memory provider
//! - Metrics
//! - The DASH stream server

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dash::DashStreamServer;
use crate::metrics::Metrics;
use crate::provider::{MemoryProvider, ProviderRegistry};

/// Application state shared across all handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// Registered stream providers, scanned in order
    pub providers: Arc<ProviderRegistry>,

    /// Built-in provider fed by the management API
    pub store: Arc<MemoryProvider>,

    /// Request and per-stream counters
    pub metrics: Arc<Metrics>,

    /// DASH playlist/segment router
    pub dash: DashStreamServer,
}

impl AppState {
    /// Create a new AppState with the given configuration. The in-memory
    /// provider is registered first.
    pub fn new(config: ServerConfig) -> Self {
        let metrics = Arc::new(Metrics::new());
        let providers = Arc::new(ProviderRegistry::new());
        let store = Arc::new(MemoryProvider::new(config.store.clone(), metrics.clone()));
        providers.register(store.clone());

        Self {
            dash: DashStreamServer::new(providers.clone(), metrics.clone()),
            config,
            providers,
            store,
            metrics,
        }
    }

    /// Create AppState with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_defaults()
    }
}
