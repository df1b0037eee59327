use shared_config::AppConfig;

use crate::document_store::DocumentStore;

/// Process-wide dependencies. Built once by the entry point and handed to
/// every cell as `Arc<AppState>`; nothing holds a connection in module state.
pub struct AppState {
    pub config: AppConfig,
    pub store: DocumentStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = DocumentStore::new(&config);
        Self { config, store }
    }
}
