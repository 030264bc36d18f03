// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Storage deal acceptance and sector seal tracking for a Filecoin storage miner.

mod config;
mod db;
mod deal;
mod error;
mod logger;
mod miner;
mod shim;
mod utils;

pub use config::{Config, ConfigApi, ConfigStore, LogConfig, MiningConfig, STORAGE_PRICE_PATH};
pub use db::{
    MemoryDB, ParityDb, SettingsStore, SettingsStoreExt, parity_db_config::ParityDbConfig,
};
pub use deal::{Deal, DealState, DealStore, ProofInfo, Proposal, Response};
pub use error::{Error, Result};
pub use logger::setup_logger;
pub use miner::{
    DealRecorder, DealStoreNotifier, DealsAwaitingSeal, DealsAwaitingSealStore, Miner,
    ProposalHandler, SealNotifier, SealTracker, current_ask_price, evaluate_proposal,
};
pub use shim::{
    address::Address,
    econ::{ParseTokenAmountError, TokenAmount},
    sector::{Commitment, PieceMetadata, SealedSectorMetadata, SectorId},
};
