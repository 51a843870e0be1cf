//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Payment gateway configuration.
    #[serde(default)]
    pub payments: PaymentsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
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

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expiry_secs: default_access_token_expiry(),
        }
    }
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA timezone that defines a check-in "day".
    #[serde(default = "default_business_timezone")]
    pub business_timezone: String,
    /// Attempts per operation before contention is surfaced to the caller.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff step between attempts, multiplied by the attempt number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            business_timezone: default_business_timezone(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_business_timezone() -> String {
    "America/New_York".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    10
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    /// Base URL of the gateway's order API.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Bearer credential for the gateway.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout for capture calls.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
    /// Currency every price point is denominated in.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fixed price to coin table.
    #[serde(default = "default_price_points")]
    pub price_points: Vec<PricePointConfig>,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_key: String::new(),
            timeout_secs: default_gateway_timeout(),
            currency: default_currency(),
            price_points: default_price_points(),
        }
    }
}

/// A purchasable coin package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricePointConfig {
    /// Price charged by the gateway.
    pub price: Decimal,
    /// Coins credited for that price.
    pub credits: i64,
}

fn default_gateway_url() -> String {
    "http://localhost:9090/v2/checkout".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_price_points() -> Vec<PricePointConfig> {
    vec![
        PricePointConfig {
            price: Decimal::new(99, 2),
            credits: 100,
        },
        PricePointConfig {
            price: Decimal::new(499, 2),
            credits: 550,
        },
        PricePointConfig {
            price: Decimal::new(999, 2),
            credits: 1200,
        },
        PricePointConfig {
            price: Decimal::new(1999, 2),
            credits: 2500,
        },
    ]
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
            .add_source(config::Environment::with_prefix("INKWELL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("INKWELL__DATABASE__URL", Some("postgres://localhost/inkwell_test")),
                ("INKWELL__JWT__SECRET", Some("env-secret")),
                ("INKWELL__SERVER__PORT", Some("9000")),
                ("INKWELL__LEDGER__BUSINESS_TIMEZONE", Some("Europe/Berlin")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/inkwell_test");
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.server.port, 9000);
                assert_eq!(config.ledger.business_timezone, "Europe/Berlin");
                assert_eq!(config.ledger.max_attempts, 5);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("INKWELL__DATABASE__URL", None::<&str>),
                ("INKWELL__JWT__SECRET", Some("env-secret")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_default_price_points() {
        let payments = PaymentsConfig::default();
        assert_eq!(payments.currency, "USD");
        assert_eq!(payments.price_points.len(), 4);
        assert_eq!(payments.price_points[0].price, dec!(0.99));
        assert_eq!(payments.price_points[0].credits, 100);
    }

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.business_timezone, "America/New_York");
        assert_eq!(ledger.max_attempts, 5);
        assert_eq!(ledger.retry_backoff_ms, 10);
    }
}
