// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod store;

pub use store::DealStore;

use cid::Cid;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::shim::{
    address::Address,
    econ::TokenAmount,
    sector::{Commitment, SectorId},
};
use crate::utils::cid::CidCborExt as _;

/// Where a deal stands in its lifecycle.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealState {
    #[default]
    Unset,
    Accepted,
    Rejected,
    Started,
    Failed,
    Staged,
    Sealed,
}

/// A client's offer to store data with a miner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Reference to the piece of data the client wants stored.
    pub piece_ref: Cid,
    /// Size of the piece, in bytes.
    pub size: u64,
    pub total_price: TokenAmount,
    /// Duration of the deal, in blocks.
    pub duration: u64,
    pub miner_address: Address,
    pub client: Address,
}

impl Proposal {
    /// Content identifier of the proposal, the stable handle a deal is tracked by.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        Cid::from_cbor_blake2b256(self)
    }
}

/// Evidence that a deal's data made it into a sealed sector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofInfo {
    pub sector_id: SectorId,
    pub comm_r: Commitment,
    pub comm_d: Commitment,
    pub piece_inclusion_proof: Option<Vec<u8>>,
}

/// The miner's answer to a [`Proposal`] and its later progress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub state: DealState,
    /// Human readable reason, set on rejection and failure.
    pub message: String,
    pub proposal_cid: Cid,
    pub proof_info: Option<ProofInfo>,
}

/// A deal as the miner remembers it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub miner: Address,
    pub proposal: Proposal,
    pub response: Response,
}
