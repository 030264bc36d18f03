// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

/// `ParityDb` options of the deals store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, smart_default::SmartDefault)]
#[serde(default)]
pub struct ParityDbConfig {
    pub enable_statistics: bool,
    #[default("lz4".to_owned())]
    pub compression_type: String,
}
