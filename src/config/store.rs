// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use parking_lot::RwLock;
use tracing::info;

use super::Config;
use crate::error::{Error, Result};

/// Read access to the node configuration by dotted path, e.g. `mining.storagePrice`.
pub trait ConfigApi: Send + Sync {
    fn config_get(&self, dotted_path: &str) -> Result<toml::Value>;
}

/// Shared, concurrently readable node configuration.
#[derive(Debug, Default)]
pub struct ConfigStore {
    config: RwLock<Config>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Sets the field at `dotted_path` from a JSON encoded value.
    ///
    /// The path must name an existing field and the value must fit its type,
    /// otherwise the configuration is left untouched.
    pub fn config_set(&self, dotted_path: &str, json_value: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(json_value)
            .map_err(|e| Error::Config(format!("invalid value for {dotted_path}: {e}")))?;
        let value = toml::Value::try_from(value)
            .map_err(|e| Error::Config(format!("invalid value for {dotted_path}: {e}")))?;

        let mut config = self.config.write();
        let mut tree = to_tree(&config)?;
        *lookup_mut(&mut tree, dotted_path)? = value;
        let updated: Config = tree
            .try_into()
            .map_err(|e| Error::Config(format!("invalid value for {dotted_path}: {e}")))?;
        *config = updated;
        info!("configuration {dotted_path} set to {json_value}");
        Ok(())
    }
}

impl ConfigApi for ConfigStore {
    fn config_get(&self, dotted_path: &str) -> Result<toml::Value> {
        let tree = to_tree(&self.config.read())?;
        lookup(&tree, dotted_path).cloned()
    }
}

fn to_tree(config: &Config) -> Result<toml::Value> {
    toml::Value::try_from(config)
        .map_err(|e| Error::Config(format!("failed to serialize configuration: {e}")))
}

fn missing(dotted_path: &str) -> Error {
    Error::Config(format!("no configuration value at {dotted_path}"))
}

fn lookup<'a>(tree: &'a toml::Value, dotted_path: &str) -> Result<&'a toml::Value> {
    dotted_path
        .split('.')
        .try_fold(tree, |node, segment| node.get(segment))
        .ok_or_else(|| missing(dotted_path))
}

fn lookup_mut<'a>(tree: &'a mut toml::Value, dotted_path: &str) -> Result<&'a mut toml::Value> {
    dotted_path
        .split('.')
        .try_fold(tree, |node, segment| node.get_mut(segment))
        .ok_or_else(|| missing(dotted_path))
}
