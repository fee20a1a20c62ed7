use std::sync::{Arc, RwLock};

use super::SyncConfig;

/// Source of the live sync settings.
///
/// Implementations must return the current values on every call; the sync
/// pipeline never caches them between runs.
pub trait ConfigProvider: Send + Sync {
    fn sync_config(&self) -> SyncConfig;
}

/// In-process settings holder shared between the admin API and the pipeline.
#[derive(Clone, Default)]
pub struct SharedSyncConfig {
    inner: Arc<RwLock<SyncConfig>>,
}

impl SharedSyncConfig {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the settings; the next sync run sees the new values.
    pub fn update(&self, config: SyncConfig) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = config;
    }
}

impl ConfigProvider for SharedSyncConfig {
    fn sync_config(&self) -> SyncConfig {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
