use std::sync::Arc;

use listsync_core::{
    Config, ConfigProvider, ContactService, SanitizedConfig, SharedSyncConfig, SqliteOrderStore,
    SyncConfig, SyncLogger, SyncTrigger,
};

/// Shared application state
pub struct AppState {
    config: Config,
    sync_config: SharedSyncConfig,
    contact_service: Arc<dyn ContactService>,
    orders: Arc<SqliteOrderStore>,
    logger: SyncLogger,
    trigger: SyncTrigger,
}

impl AppState {
    pub fn new(
        config: Config,
        sync_config: SharedSyncConfig,
        contact_service: Arc<dyn ContactService>,
        orders: Arc<SqliteOrderStore>,
        logger: SyncLogger,
        trigger: SyncTrigger,
    ) -> Self {
        Self {
            config,
            sync_config,
            contact_service,
            orders,
            logger,
            trigger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Startup config with the live sync settings in place of the file's.
    pub fn sanitized_config(&self) -> SanitizedConfig {
        let mut config = self.config.clone();
        config.sync = self.sync_settings();
        SanitizedConfig::from(&config)
    }

    pub fn sync_settings(&self) -> SyncConfig {
        self.sync_config.sync_config()
    }

    pub fn update_sync_settings(&self, settings: SyncConfig) {
        self.sync_config.update(settings);
    }

    pub fn contact_service(&self) -> &dyn ContactService {
        self.contact_service.as_ref()
    }

    pub fn orders(&self) -> &SqliteOrderStore {
        self.orders.as_ref()
    }

    pub fn logger(&self) -> &SyncLogger {
        &self.logger
    }

    pub fn trigger(&self) -> &SyncTrigger {
        &self.trigger
    }
}
