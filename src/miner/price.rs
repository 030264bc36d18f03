// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::config::{ConfigApi, STORAGE_PRICE_PATH};
use crate::error::{Error, Result};
use crate::shim::econ::TokenAmount;

/// Reads the miner's current asking price from the configuration.
pub fn current_ask_price(config: &dyn ConfigApi) -> Result<TokenAmount> {
    match config.config_get(STORAGE_PRICE_PATH)? {
        toml::Value::String(price) => price
            .parse()
            .map_err(|e| Error::Config(format!("{STORAGE_PRICE_PATH}: {e}"))),
        toml::Value::Integer(price) if price >= 0 => Ok(TokenAmount::from_atto(price)),
        other => Err(Error::Config(format!(
            "{STORAGE_PRICE_PATH} must be a non-negative decimal, got {other}"
        ))),
    }
}
