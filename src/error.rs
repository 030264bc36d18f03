// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Storage miner deal-core error.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration, e.g. the asking price.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to write to the deals store: {0:#}")]
    StorageWrite(anyhow::Error),
    #[error("failed to read from the deals store: {0:#}")]
    StorageRead(anyhow::Error),
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Error returned by an accept or reject handler, passed through untouched.
    #[error(transparent)]
    Handler(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
