//! Integration tests for configuration loading.

use std::io::Write;

use lendflow::config::Config;
use lendflow::error::{ConfigError, Error};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_complete_config_file() {
    let file = write_config(
        r#"
        [network]
        rpc_url = "https://fullnode.mainnet.sui.io:443"

        [env]
        package_id = "0xf95b06141ed4a174f239417323bde3f209b972f5930d8521ea38a52aff3a6ddf"
        lending_market_id = "0x84030d26d85eaa7035084a057f2f11f701b7e2e4eda87551becbc7c97505ece1"
        lending_market_type = "0xf95b::suilend::MAIN_POOL"

        [engine]
        coin_type = "0x2::sui::SUI"
        fee_budget = 250000000

        [logging]
        level = "debug"
        format = "json"
    "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.engine.fee_budget, 250_000_000);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn missing_file_is_a_read_error() {
    let err = Config::load("/nonexistent/config.toml").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[network\nrpc_url = ");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn unconfigured_deployment_ids_fail_validation() {
    // Relies on the deployment env vars not being set in the test process.
    let file = write_config(
        r#"
        [network]
        rpc_url = "https://fullnode.mainnet.sui.io:443"
    "#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::MissingField { .. })
    ));
}
