use std::sync::Arc;

use crate::config::Config;
use crate::db::ReviewStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReviewStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
