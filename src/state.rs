//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{AuthService, ListingService};
use crate::upload::UploadStore;

/// Cloneable handle extracted in handlers with `State<AppState>`
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
    uploads: UploadStore,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let uploads = UploadStore::new(config.uploads.dir.clone(), config.uploads.public_prefix.clone());
        Self {
            store,
            config: Arc::new(config),
            uploads,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.config.security.clone())
    }

    pub fn listing_service(&self) -> ListingService {
        ListingService::new(self.store.clone(), self.uploads.clone(), self.config.uploads.max_files)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.store.backend())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
