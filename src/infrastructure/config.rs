//! Configuration management for shopbridge.
//!
//! All settings come from the environment (`SHOPBRIDGE_` prefix, nested
//! keys split on `__`), merged over programmatic defaults and validated
//! before the server starts. Missing required settings are fatal.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shop.url is required (set SHOPBRIDGE_SHOP__URL)")]
    MissingShopUrl,

    #[error("shop.email is required (set SHOPBRIDGE_SHOP__EMAIL)")]
    MissingShopEmail,

    #[error("shop.api_key is required (set SHOPBRIDGE_SHOP__API_KEY)")]
    MissingShopApiKey,

    #[error("shop.page_size must be at least 1")]
    InvalidPageSize,

    #[error("orders.admin_url is required (set SHOPBRIDGE_ORDERS__ADMIN_URL)")]
    MissingAdminUrl,

    #[error(
        "orders.product_link_template must contain the {{id}} placeholder, got: {0}"
    )]
    InvalidLinkTemplate(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub shop: ShopConfig,
    pub cache: CacheConfig,
    pub orders: OrdersConfig,
    pub logging: LoggingConfig,
}

/// Backend endpoint and credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Backend base URL, without a trailing slash.
    pub url: String,
    /// Credential email; sent Basic-encoded together with the key.
    pub email: String,
    pub api_key: String,
    /// Items requested per page when draining collections.
    pub page_size: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            email: String::new(),
            api_key: String::new(),
            page_size: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Catalog TTL in seconds; 0 disables caching entirely.
    pub ttl_secs: u64,
    /// Directory holding the durable cache files.
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 0,
            dir: ".shopbridge/cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrdersConfig {
    /// Admin panel base URL used to build order detail links.
    pub admin_url: String,
    /// Product link template containing an `{id}` placeholder.
    pub product_link_template: String,
    /// Custom-field id carrying the customer's contact channel; empty
    /// disables the lookup.
    pub contact_field_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the rolling log file. Stdout carries protocol frames
    /// only, so file plus stderr is all the logging there is.
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: ".shopbridge/logs".to_string(),
        }
    }
}

/// Configuration loader: defaults merged with `SHOPBRIDGE_*` environment
/// variables, then validated.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> anyhow::Result<Config> {
        use anyhow::Context;

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("SHOPBRIDGE_").split("__"))
            .extract()
            .context("Failed to extract configuration from environment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.shop.url.is_empty() {
            return Err(ConfigError::MissingShopUrl);
        }
        if config.shop.email.is_empty() {
            return Err(ConfigError::MissingShopEmail);
        }
        if config.shop.api_key.is_empty() {
            return Err(ConfigError::MissingShopApiKey);
        }
        if config.shop.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if config.orders.admin_url.is_empty() {
            return Err(ConfigError::MissingAdminUrl);
        }
        if !config.orders.product_link_template.contains("{id}") {
            return Err(ConfigError::InvalidLinkTemplate(
                config.orders.product_link_template.clone(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}
