//! Configuration schema definitions

use crate::conversation::DEFAULT_SWEEP_INTERVAL_MINUTES;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for aria
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Sampling parameters sent with every completion request
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Conversation memory limits
    #[serde(default)]
    pub memory: MemoryConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// OpenAI-compatible provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer credential
    #[serde(default)]
    pub api_key: String,
    /// Base URL, without the `/chat/completions` suffix
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra headers sent with every request
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_penalty")]
    pub presence_penalty: f32,
    #[serde(default = "default_penalty")]
    pub frequency_penalty: f32,
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_penalty() -> f32 {
    0.1
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            presence_penalty: default_penalty(),
            frequency_penalty: default_penalty(),
        }
    }
}

/// Conversation memory limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum entries kept per client
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// History entries replayed as chat turns
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
    /// History entries rendered into the system prompt
    #[serde(default = "default_prompt_context_entries")]
    pub prompt_context_entries: usize,
    /// Idle time after which a conversation is forgotten
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    /// Period of the eviction sweep
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

fn default_max_history() -> usize {
    10
}

fn default_context_turns() -> usize {
    6
}

fn default_prompt_context_entries() -> usize {
    3
}

fn default_retention_hours() -> u64 {
    24
}

fn default_sweep_interval_minutes() -> u64 {
    60
}

impl MemoryConfig {
    /// Sweep period; the default period if the minutes overflow
    pub fn sweep_interval(&self) -> std::time::Duration {
        let secs = self
            .sweep_interval_minutes
            .checked_mul(60)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_MINUTES * 60);
        std::time::Duration::from_secs(secs)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            context_turns: default_context_turns(),
            prompt_context_entries: default_prompt_context_entries(),
            retention_hours: default_retention_hours(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Key conversations by the first `X-Forwarded-For` address
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            trust_forwarded_for: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_constants() {
        let config = Config::default();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.generation.max_tokens, 1200);
        assert_eq!(config.memory.max_history, 10);
        assert_eq!(config.memory.context_turns, 6);
        assert_eq!(config.memory.prompt_context_entries, 3);
        assert_eq!(config.memory.retention_hours, 24);
        assert_eq!(config.memory.sweep_interval_minutes, 60);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_sweep_interval_does_not_overflow() {
        let mut memory = MemoryConfig::default();
        assert_eq!(memory.sweep_interval(), std::time::Duration::from_secs(3600));

        memory.sweep_interval_minutes = u64::MAX;
        assert_eq!(memory.sweep_interval(), std::time::Duration::from_secs(3600));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"provider":{"api_key":"sk-test"},"server":{"port":8080}}"#)
                .unwrap();
        assert_eq!(config.provider.api_key, "sk-test");
        assert_eq!(config.provider.api_base, "https://api.openai.com/v1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, "public");
    }
}
