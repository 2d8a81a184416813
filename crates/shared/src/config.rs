//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing-run job configuration.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Billing-run job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Maximum number of billing-period transitions processed per run.
    #[serde(default = "default_transition_batch_size")]
    pub transition_batch_size: u64,
    /// Whether the run processes livemode subscriptions (false = test mode only).
    #[serde(default = "default_livemode")]
    pub livemode: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            transition_batch_size: default_transition_batch_size(),
            livemode: default_livemode(),
        }
    }
}

fn default_transition_batch_size() -> u64 {
    500
}

fn default_livemode() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_config_defaults() {
        let billing = BillingConfig::default();
        assert_eq!(billing.transition_batch_size, 500);
        assert!(billing.livemode);
    }

    #[test]
    fn test_database_config_defaults() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"url": "postgres://localhost/ledgerline"}"#).unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
    }
}
