//! Configuration loading and validation.
//!
//! Configuration comes from a TOML file with a `Default` fallback, plus an
//! environment overlay for deployment identifiers and secrets (the same
//! variables the `.env` file carries: `SUI_PACKAGE_ID`, `LENDING_MARKET_OBJ`,
//! `LENDING_MARKET_TYPE`, `PRIVATE_KEY`, `OWNER_ADDRESS`). Validation runs
//! before anything touches the network and reports structured [`ConfigError`]s.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::ObjectId;
use crate::error::{ConfigError, Error, Result};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub env: EnvConfig,
    pub engine: EngineConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Fullnode JSON-RPC endpoint.
    pub rpc_url: String,
}

/// Deployment identifiers of the target lending market. Immutable once
/// loaded; the engine never mutates these.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvConfig {
    /// Contract package id.
    pub package_id: ObjectId,
    /// Shared lending-market object id.
    pub lending_market_id: ObjectId,
    /// Fully qualified lending-market type tag.
    pub lending_market_type: String,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Default coin type supplied when the caller names none.
    pub coin_type: String,
    /// Fee budget in native base units.
    pub fee_budget: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct WalletConfig {
    /// Hex-encoded private key. Usually injected via `PRIVATE_KEY`.
    pub private_key: Option<String>,
    /// Owner address the key authorizes. Injected via `OWNER_ADDRESS`.
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load from a TOML file, apply the environment overlay, and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override deployment identifiers and secrets from process environment.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SUI_PACKAGE_ID") {
            self.env.package_id = ObjectId::new(v);
        }
        if let Ok(v) = std::env::var("LENDING_MARKET_OBJ") {
            self.env.lending_market_id = ObjectId::new(v);
        }
        if let Ok(v) = std::env::var("LENDING_MARKET_TYPE") {
            self.env.lending_market_type = v;
        }
        if let Ok(v) = std::env::var("PRIVATE_KEY") {
            self.wallet.private_key = Some(v);
        }
        if let Ok(v) = std::env::var("OWNER_ADDRESS") {
            self.wallet.address = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "network.rpc_url",
            }));
        }
        if self.env.package_id.as_str().is_empty() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "env.package_id",
            }));
        }
        if self.env.lending_market_id.as_str().is_empty() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "env.lending_market_id",
            }));
        }
        if self.env.lending_market_type.is_empty() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "env.lending_market_type",
            }));
        }
        if self.engine.fee_budget == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "engine.fee_budget",
                reason: "fee budget must be non-zero".into(),
            }));
        }
        Ok(())
    }

    /// Initialize the tracing subscriber from the logging section.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                rpc_url: "https://fullnode.mainnet.sui.io:443".into(),
            },
            env: EnvConfig {
                package_id: ObjectId::new(""),
                lending_market_id: ObjectId::new(""),
                lending_market_type: String::new(),
            },
            engine: EngineConfig {
                coin_type: "0x2::sui::SUI".into(),
                fee_budget: 100_000_000,
            },
            wallet: WalletConfig::default(),
            logging: LoggingConfig {
                level: "info".into(),
                format: "pretty".into(),
            },
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Config::default().network
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Config::default().env
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Config::default().engine
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Config::default().logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_toml() -> &'static str {
        r#"
            [network]
            rpc_url = "https://fullnode.mainnet.sui.io:443"

            [env]
            package_id = "0xf95b06141ed4a174f239417323bde3f209b972f5930d8521ea38a52aff3a6ddf"
            lending_market_id = "0x84030d26d85eaa7035084a057f2f11f701b7e2e4eda87551becbc7c97505ece1"
            lending_market_type = "0xf95b::suilend::MAIN_POOL"

            [engine]
            coin_type = "0x2::sui::SUI"
            fee_budget = 100000000

            [logging]
            level = "info"
            format = "pretty"
        "#
    }

    #[test]
    fn parses_and_validates_full_config() {
        let config: Config = toml::from_str(valid_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.engine.fee_budget, 100_000_000);
    }

    #[test]
    fn missing_market_id_is_a_config_error() {
        let mut config: Config = toml::from_str(valid_toml()).unwrap();
        config.env.lending_market_id = ObjectId::new("");
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField {
                field: "env.lending_market_id"
            })
        ));
    }

    #[test]
    fn zero_fee_budget_is_rejected() {
        let mut config: Config = toml::from_str(valid_toml()).unwrap();
        config.engine.fee_budget = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.engine.fee_budget, 100_000_000);
    }
}
