pub mod config;
pub mod contact_service;
pub mod metrics;
pub mod order;
pub mod sync;
pub mod sync_log;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config, ConfigError,
    ConfigProvider, SanitizedConfig, SharedSyncConfig, SyncConfig,
};
pub use contact_service::{
    ActiveCampaignClient, ApiCredentials, ContactData, ContactService, ContactServiceError,
};
pub use order::{
    OrderContactData, OrderError, OrderSource, OrderStatus, SqliteOrderStore, SyncMarkerStore,
};
pub use sync::{
    create_sync_queue, QueueError, SyncError, SyncJob, SyncOrchestrator, SyncOutcome, SyncQueue,
    SyncTrigger, SyncWorker,
};
pub use sync_log::{
    LogEntry, LogStore, LogStoreError, MemoryLogStore, SqliteLogStore, SyncLogger, LOG_CAPACITY,
};
