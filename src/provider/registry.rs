//! Ordered provider registry
//!
//! Readers take a snapshot (an `Arc` of the provider list) and iterate it
//! without holding the lock. Writers replace the whole list, so a scan in
//! progress never sees a partially updated registry.

use parking_lot::RwLock;
use std::sync::Arc;

use super::StreamProvider;

pub type ProviderList = Arc<Vec<Arc<dyn StreamProvider>>>;

#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<ProviderList>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; it is scanned after every provider registered before it.
    pub fn register(&self, provider: Arc<dyn StreamProvider>) {
        let mut providers = self.providers.write();
        let mut next = Vec::with_capacity(providers.len() + 1);
        next.extend(providers.iter().cloned());
        tracing::info!(
            "Registered stream provider '{}' at position {}",
            provider.name(),
            next.len()
        );
        next.push(provider);
        *providers = Arc::new(next);
    }

    /// Remove every provider with the given name. Returns how many were removed.
    pub fn deregister(&self, name: &str) -> usize {
        let mut providers = self.providers.write();
        let next: Vec<_> = providers
            .iter()
            .filter(|p| p.name() != name)
            .cloned()
            .collect();
        let removed = providers.len() - next.len();
        if removed > 0 {
            tracing::info!("Deregistered stream provider '{}'", name);
            *providers = Arc::new(next);
        }
        removed
    }

    /// The current provider list, in registration order.
    pub fn snapshot(&self) -> ProviderList {
        self.providers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshot().iter().map(|p| p.name().to_string()).collect()
    }
}
