use crate::models::Journal;
use crate::storage::JsonStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: JsonStore,
    pub journal: Arc<Mutex<Journal>>,
}

impl AppState {
    pub fn new(store: JsonStore, journal: Journal) -> Self {
        Self {
            store,
            journal: Arc::new(Mutex::new(journal)),
        }
    }
}
