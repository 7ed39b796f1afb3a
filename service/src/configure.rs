use std::time::Duration;

use config::{
    builder::{ConfigBuilder, DefaultState},
    Config, ConfigError, Environment, File,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "config/transfers";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rpc_url: String,
    pub graphql_url: String,
    pub axie_contract: String,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub explorer_url: String,
    pub log_dir: String,
    pub reconcile_timed_out: bool,
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("rpc_url", "https://proxy.roninchain.com/free-gas-rpc")?
        .set_default("graphql_url", "https://graphql-gateway.axieinfinity.com/graphql")?
        .set_default("axie_contract", "0x32950db2a7164ae833121501c797d79e7b79d74c")?
        .set_default("chain_id", 2020_i64)?
        .set_default("gas_limit", 500_000_i64)?
        .set_default("poll_interval_secs", 10_i64)?
        .set_default("timeout_secs", 600_i64)?
        .set_default("explorer_url", "https://explorer.roninchain.com/tx")?
        .set_default("log_dir", "logs")?
        .set_default("reconcile_timed_out", false)
}

/// Defaults, then the config file, then `AXIE_*` environment variables.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let s = defaults()?
        .add_source(file)
        .add_source(Environment::with_prefix("AXIE"))
        .build()?;

    s.try_deserialize()
}
