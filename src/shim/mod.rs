// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod econ;
pub mod sector;

pub mod address {
    /// Actor address of a miner or client. Opaque to the deal core.
    pub type Address = String;
}
