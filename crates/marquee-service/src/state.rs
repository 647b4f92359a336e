//! Application state.

use std::sync::Arc;

use marquee_store::RocksStore;

use crate::config::ServiceConfig;
use crate::provider::ProviderClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger store.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Payment provider client (optional).
    pub provider: Option<Arc<ProviderClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let provider = config.provider_api_key.as_ref().map(|key| {
            tracing::info!("payment provider integration enabled");
            Arc::new(ProviderClient::new(key))
        });

        if provider.is_none() {
            tracing::warn!("payment provider not configured - deposit intents will not be available");
        }

        if config.service_api_key.is_none() {
            tracing::warn!("service API key not configured - accrual ingestion will reject all calls");
        }

        Self {
            store,
            config,
            provider,
        }
    }
}
