//! Shared application state.

use std::sync::Arc;

use crate::config::SweetShopConfig;
use crate::services::CatalogService;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Shared application state passed to all route handlers.
///
/// Cheap to clone; the inner state lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SweetShopConfig,
    supabase: SupabaseClient,
    catalog: CatalogService,
}

impl AppState {
    /// Build application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase HTTP client cannot be constructed.
    pub fn new(config: SweetShopConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;
        let catalog = CatalogService::new(supabase.clone());
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                catalog,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SweetShopConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }
}
