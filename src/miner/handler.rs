// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use cid::Cid;
use tracing::{error, info};

use super::awaiting_seal::SealNotifier;
use crate::db::SettingsStore;
use crate::deal::{Deal, DealState, DealStore, ProofInfo, Proposal, Response};
use crate::shim::{address::Address, sector::SealedSectorMetadata};

/// Carries out the decision taken on a proposal.
#[async_trait]
pub trait ProposalHandler: Send + Sync {
    async fn accept(&self, proposal: &Proposal) -> anyhow::Result<Response>;
    async fn reject(&self, proposal: &Proposal, reason: &str) -> anyhow::Result<Response>;
}

/// [`ProposalHandler`] that records every decision in the [`DealStore`].
pub struct DealRecorder<DB> {
    miner: Address,
    deals: DealStore<DB>,
}

impl<DB> DealRecorder<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    pub fn new(miner: Address, deals: DealStore<DB>) -> Self {
        Self { miner, deals }
    }

    fn record(
        &self,
        proposal: &Proposal,
        state: DealState,
        message: &str,
    ) -> anyhow::Result<Response> {
        let response = Response {
            state,
            message: message.to_owned(),
            proposal_cid: proposal.cid()?,
            proof_info: None,
        };
        self.deals.put_deal(&Deal {
            miner: self.miner.clone(),
            proposal: proposal.clone(),
            response: response.clone(),
        })?;
        Ok(response)
    }
}

#[async_trait]
impl<DB> ProposalHandler for DealRecorder<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    async fn accept(&self, proposal: &Proposal) -> anyhow::Result<Response> {
        self.record(proposal, DealState::Accepted, "")
    }

    async fn reject(&self, proposal: &Proposal, reason: &str) -> anyhow::Result<Response> {
        info!("rejecting storage proposal from {}: {reason}", proposal.client);
        self.record(proposal, DealState::Rejected, reason)
    }
}

/// [`SealNotifier`] that advances stored deals to `Sealed` or `Failed`.
pub struct DealStoreNotifier<DB> {
    deals: DealStore<DB>,
}

impl<DB> DealStoreNotifier<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    pub fn new(deals: DealStore<DB>) -> Self {
        Self { deals }
    }

    fn update(&self, deal: &Cid, update: impl FnOnce(&Deal) -> Response) {
        let result = self.deals.get_deal(deal).and_then(|stored| match stored {
            Some(stored) => self.deals.update_response(deal, update(&stored)).map(drop),
            None => Err(anyhow::anyhow!("deal is not in the deals store")),
        });
        if let Err(e) = result {
            error!("failed to update deal {deal} after sealing: {e:#}");
        }
    }
}

impl<DB> SealNotifier for DealStoreNotifier<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    fn on_success(&self, deal: &Cid, sector: &SealedSectorMetadata) {
        self.update(deal, |stored| Response {
            state: DealState::Sealed,
            message: String::new(),
            proposal_cid: *deal,
            proof_info: Some(ProofInfo {
                sector_id: sector.sector_id,
                comm_r: sector.comm_r,
                comm_d: sector.comm_d,
                piece_inclusion_proof: sector
                    .piece_inclusion_proof(&stored.proposal.piece_ref.to_string())
                    .map(<[u8]>::to_vec),
            }),
        });
    }

    fn on_failure(&self, deal: &Cid, reason: &str) {
        self.update(deal, |_| Response {
            state: DealState::Failed,
            message: reason.to_owned(),
            proposal_cid: *deal,
            proof_info: None,
        });
    }
}
