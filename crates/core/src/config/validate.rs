use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration at startup.
///
/// An incomplete `[sync]` section is accepted here: the sync pipeline refuses
/// to run until the missing settings are supplied.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.queue.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "queue.buffer_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}
