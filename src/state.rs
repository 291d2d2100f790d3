use std::sync::Arc;

use crate::services::live_hub::LiveHub;
use crate::services::live_service::LiveService;
use crate::services::live_store::LiveStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LiveStore>,
    pub hub: LiveHub,
    pub live: LiveService,
}

impl AppState {
    pub fn new(store: Arc<dyn LiveStore>) -> Self {
        let hub = LiveHub::new();
        let live = LiveService::new(store.clone(), hub.clone());
        AppState { store, hub, live }
    }
}
