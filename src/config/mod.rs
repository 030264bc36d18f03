// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod store;

pub use store::{ConfigApi, ConfigStore};

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::db::parity_db_config::ParityDbConfig;
use crate::utils::io::read_toml;

/// Dotted configuration path of the miner's asking price.
pub const STORAGE_PRICE_PATH: &str = "mining.storagePrice";

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, smart_default::SmartDefault)]
#[serde(default, rename_all = "camelCase")]
pub struct MiningConfig {
    /// Minimum total price, in atto, the miner accepts for a storage deal.
    #[default("0".to_owned())]
    pub storage_price: String,
    /// Address of the miner actor, stamped on stored deals.
    pub miner_address: String,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub struct LogValue {
    pub module: String,
    pub level: String,
}

impl LogValue {
    pub fn new(module: &str, level: LevelFilter) -> Self {
        Self {
            module: module.to_string(),
            level: level.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct LogConfig {
    pub filters: Vec<LogValue>,
}

impl LogConfig {
    pub fn to_filter_string(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("{}={}", f.module, f.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filters: vec![
                LogValue::new("parity_db", LevelFilter::WARN),
                LogValue::new("storage_miner", LevelFilter::INFO),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub mining: MiningConfig,
    pub deals_db: ParityDbConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn from_toml(toml_string: &str) -> anyhow::Result<Self> {
        read_toml(toml_string)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let toml_string = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&toml_string)
    }
}
