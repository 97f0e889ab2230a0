use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::events::EventBus;
use crate::quota::QuotaTracker;
use crate::store::{FileStore, KeyValueStore};
use crate::theme::ThemeManager;

/// All local state for one installation, built once at startup and shared
pub struct LocalContext {
    pub events: EventBus,
    pub quota: QuotaTracker,
    pub theme: ThemeManager,
}

impl LocalContext {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::new();
        Self {
            quota: QuotaTracker::new(store.clone(), clock, events.clone()),
            theme: ThemeManager::new(store, events.clone()),
            events,
        }
    }

    /// File-backed context using the system clock
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        let store = FileStore::open(dir)?;
        Ok(Self::new(Arc::new(store), Arc::new(SystemClock)))
    }
}
