//! Configuration validation rules.

use super::schema::Config;
use crate::conversation::{MAX_RETENTION_HOURS, MAX_SWEEP_INTERVAL_MINUTES};

/// Validate configuration and return aggregated validation errors.
///
/// A missing API key is not an error here: the service still starts and
/// every chat request falls back until a key is configured.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.provider.api_base.trim().is_empty() {
        errors.push("provider.api_base must not be empty".to_string());
    }
    if config.provider.model.trim().is_empty() {
        errors.push("provider.model must not be empty".to_string());
    }
    if config.provider.timeout_secs == 0 {
        errors.push("provider.timeout_secs must be > 0".to_string());
    }

    if config.generation.max_tokens == 0 {
        errors.push("generation.max_tokens must be > 0".to_string());
    }
    if !(0.0..=2.0).contains(&config.generation.temperature) {
        errors.push("generation.temperature must be in [0.0, 2.0]".to_string());
    }
    if !(-2.0..=2.0).contains(&config.generation.presence_penalty) {
        errors.push("generation.presence_penalty must be in [-2.0, 2.0]".to_string());
    }
    if !(-2.0..=2.0).contains(&config.generation.frequency_penalty) {
        errors.push("generation.frequency_penalty must be in [-2.0, 2.0]".to_string());
    }

    if config.memory.max_history == 0 {
        errors.push("memory.max_history must be > 0".to_string());
    }
    if !(1..=MAX_RETENTION_HOURS).contains(&config.memory.retention_hours) {
        errors.push(format!(
            "memory.retention_hours must be in [1, {}]",
            MAX_RETENTION_HOURS
        ));
    }
    if !(1..=MAX_SWEEP_INTERVAL_MINUTES).contains(&config.memory.sweep_interval_minutes) {
        errors.push(format!(
            "memory.sweep_interval_minutes must be in [1, {}]",
            MAX_SWEEP_INTERVAL_MINUTES
        ));
    }

    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
