// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::LogConfig;

/// Installs the global console logger. `RUST_LOG`, when set, takes precedence
/// over the configured filters.
pub fn setup_logger(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_writer(std::io::stderr)
                .with_filter(get_env_filter(config.to_filter_string())),
        )
        .init();
}

fn get_env_filter(default: String) -> EnvFilter {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(filter) if !filter.is_empty() => EnvFilter::new(filter),
        _ => EnvFilter::new(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used_without_env() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let filter = get_env_filter(LogConfig::default().to_filter_string());
        assert!(filter.to_string().contains("storage_miner=info"));
    }
}
