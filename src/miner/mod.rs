// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Storage deal acceptance and sector seal tracking of a storage miner.
//!
//! Inbound proposals are priced against the configured ask and handed to a
//! [`ProposalHandler`]. Accepted deals are staged into sectors by the sector
//! builder; the [`SealTracker`] correlates those sectors with their deals and
//! notifies each deal once its sector seals or fails. The tracker table is
//! saved after every change so in-flight deals survive a restart.

mod awaiting_seal;
mod handler;
mod persist;
mod price;

pub use awaiting_seal::{DealsAwaitingSeal, SealNotifier, SealTracker};
pub use handler::{DealRecorder, DealStoreNotifier, ProposalHandler};
pub use persist::DealsAwaitingSealStore;
pub use price::current_ask_price;

use std::sync::Arc;

use cid::Cid;
use tracing::{debug, error};

use crate::config::ConfigApi;
use crate::db::SettingsStore;
use crate::deal::{Deal, DealState, DealStore, Proposal, Response};
use crate::error::{Error, Result};
use crate::shim::{
    address::Address,
    sector::{SealedSectorMetadata, SectorId},
};

/// Decides whether `proposal` clears the miner's asking price and lets
/// `handler` act on the decision.
pub async fn evaluate_proposal(
    config: &dyn ConfigApi,
    handler: &dyn ProposalHandler,
    proposal: &Proposal,
) -> Result<Response> {
    let ask = current_ask_price(config)?;
    if proposal.total_price >= ask {
        handler.accept(proposal).await.map_err(Error::Handler)
    } else {
        let reason = format!(
            "proposed price {} is less that miner's current asking price: {ask}",
            proposal.total_price
        );
        handler
            .reject(proposal, &reason)
            .await
            .map_err(Error::Handler)
    }
}

pub struct Miner<DB> {
    config: Arc<dyn ConfigApi>,
    proposal_handler: Arc<dyn ProposalHandler>,
    deals_awaiting_seal: SealTracker,
    deals_awaiting_seal_store: DealsAwaitingSealStore<DB>,
    deals: DealStore<DB>,
}

impl<DB> Miner<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    pub fn new(
        config: Arc<dyn ConfigApi>,
        proposal_handler: Arc<dyn ProposalHandler>,
        seal_notifier: Arc<dyn SealNotifier>,
        deals_db: Arc<DB>,
    ) -> Self {
        Self {
            config,
            proposal_handler,
            deals_awaiting_seal: SealTracker::new(seal_notifier),
            deals_awaiting_seal_store: DealsAwaitingSealStore::new(deals_db.clone()),
            deals: DealStore::new(deals_db),
        }
    }

    /// Miner that records its deals, and their sealing outcome, in `deals_db`.
    pub fn with_deals_store(
        config: Arc<dyn ConfigApi>,
        miner: Address,
        deals_db: Arc<DB>,
    ) -> Self {
        let deals = DealStore::new(deals_db.clone());
        Self::new(
            config,
            Arc::new(DealRecorder::new(miner, deals.clone())),
            Arc::new(DealStoreNotifier::new(deals)),
            deals_db,
        )
    }

    pub async fn receive_storage_proposal(&self, proposal: &Proposal) -> Result<Response> {
        evaluate_proposal(
            self.config.as_ref(),
            self.proposal_handler.as_ref(),
            proposal,
        )
        .await
    }

    /// Restores the deals-awaiting-seal table saved by a previous run.
    pub fn load_deals_awaiting_seal(&self) -> Result<()> {
        let table = self.deals_awaiting_seal_store.load()?;
        debug!(
            sectors = table.sectors_to_deals.len(),
            "loaded deals awaiting seal"
        );
        self.deals_awaiting_seal.restore(table);
        Ok(())
    }

    fn save_deals_awaiting_seal(&self) -> Result<()> {
        self.deals_awaiting_seal_store
            .save(&self.deals_awaiting_seal.snapshot())
            .inspect_err(|e| error!("deals awaiting seal may be lost on restart: {e}"))
    }

    /// Called once the sector builder has staged `deal` into `sector_id`.
    pub fn on_deal_staged(&self, sector_id: SectorId, deal: Cid) -> Result<()> {
        // Marked staged first: registering against an already resolved sector
        // advances the deal further right away.
        if let Some(stored) = self.deals.get_deal(&deal).map_err(Error::StorageRead)? {
            self.deals
                .update_response(
                    &deal,
                    Response {
                        state: DealState::Staged,
                        ..stored.response
                    },
                )
                .map_err(Error::StorageWrite)?;
        }
        self.deals_awaiting_seal.register(sector_id, deal);
        self.save_deals_awaiting_seal()
    }

    /// Called by the sector builder when a sector has been sealed.
    pub fn on_sector_sealed(&self, sector: SealedSectorMetadata) -> Result<()> {
        self.deals_awaiting_seal.resolve_success(sector);
        self.save_deals_awaiting_seal()
    }

    /// Called by the sector builder when sealing a sector failed.
    pub fn on_sector_failed(&self, sector_id: SectorId, reason: &str) -> Result<()> {
        self.deals_awaiting_seal.resolve_failure(sector_id, reason);
        self.save_deals_awaiting_seal()
    }

    pub fn deals_awaiting_seal(&self) -> &SealTracker {
        &self.deals_awaiting_seal
    }

    pub fn get_deal(&self, proposal_cid: &Cid) -> Result<Option<Deal>> {
        self.deals.get_deal(proposal_cid).map_err(Error::StorageRead)
    }

    /// Lists every deal known to the miner.
    pub fn deals_ls(&self) -> flume::Receiver<anyhow::Result<Deal>> {
        self.deals.deals_ls()
    }
}

#[cfg(test)]
mod tests {
    use super::awaiting_seal::tests::{Event, Recorder, test_cid};
    use super::*;
    use crate::config::{ConfigStore, STORAGE_PRICE_PATH};
    use crate::db::MemoryDB;
    use crate::shim::econ::TokenAmount;
    use crate::shim::sector::PieceMetadata;
    use futures::StreamExt as _;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct TestHandler {
        accepted: Mutex<usize>,
        rejected: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl ProposalHandler for TestHandler {
        async fn accept(&self, _: &Proposal) -> anyhow::Result<Response> {
            *self.accepted.lock() += 1;
            Ok(Response {
                state: DealState::Accepted,
                ..Default::default()
            })
        }

        async fn reject(&self, _: &Proposal, reason: &str) -> anyhow::Result<Response> {
            *self.rejected.lock() += 1;
            Ok(Response {
                state: DealState::Rejected,
                message: reason.to_owned(),
                ..Default::default()
            })
        }
    }

    struct FailingHandler;

    #[async_trait::async_trait]
    impl ProposalHandler for FailingHandler {
        async fn accept(&self, _: &Proposal) -> anyhow::Result<Response> {
            anyhow::bail!("signing failed")
        }

        async fn reject(&self, _: &Proposal, _: &str) -> anyhow::Result<Response> {
            anyhow::bail!("sending failed")
        }
    }

    fn config_with_price(price: &str) -> Arc<ConfigStore> {
        let config = ConfigStore::default();
        config
            .config_set(STORAGE_PRICE_PATH, &format!("{price:?}"))
            .unwrap();
        Arc::new(config)
    }

    fn proposal(price: u64) -> Proposal {
        Proposal {
            piece_ref: test_cid(1000 + price),
            size: 1024,
            total_price: TokenAmount::from_atto(price),
            duration: 10_000,
            client: "t0101".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn accepts_proposals_with_sufficient_total_price() {
        let handler = TestHandler::default();
        let config = config_with_price("50");
        for price in [75, 50] {
            let res = evaluate_proposal(config.as_ref(), &handler, &proposal(price))
                .await
                .unwrap();
            assert_eq!(res.state, DealState::Accepted);
        }
        assert_eq!(*handler.accepted.lock(), 2);
        assert_eq!(*handler.rejected.lock(), 0);
    }

    #[tokio::test]
    async fn rejects_proposals_with_insufficient_total_price() {
        let handler = TestHandler::default();
        let res = evaluate_proposal(config_with_price("50").as_ref(), &handler, &proposal(25))
            .await
            .unwrap();
        assert_eq!(*handler.accepted.lock(), 0);
        assert_eq!(*handler.rejected.lock(), 1);
        assert_eq!(res.state, DealState::Rejected);
        assert_eq!(
            res.message,
            "proposed price 25 is less that miner's current asking price: 50"
        );
    }

    #[tokio::test]
    async fn missing_price_config_is_propagated() {
        struct NoConfig;
        impl ConfigApi for NoConfig {
            fn config_get(&self, dotted_path: &str) -> Result<toml::Value> {
                Err(Error::Config(format!("no configuration value at {dotted_path}")))
            }
        }
        let handler = TestHandler::default();
        let res = evaluate_proposal(&NoConfig, &handler, &proposal(25)).await;
        assert!(matches!(res, Err(Error::Config(_))));
        assert_eq!(*handler.accepted.lock() + *handler.rejected.lock(), 0);
    }

    #[tokio::test]
    async fn handler_errors_pass_through() {
        let config = config_with_price("50");
        let err = evaluate_proposal(config.as_ref(), &FailingHandler, &proposal(75))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "signing failed");

        let err = evaluate_proposal(config.as_ref(), &FailingHandler, &proposal(5))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "sending failed");
    }

    #[test]
    fn staged_deals_survive_restart() {
        let db = Arc::new(MemoryDB::default());
        let recorder = Arc::new(Recorder::default());
        let new_miner = || {
            Miner::new(
                config_with_price("0"),
                Arc::new(TestHandler::default()),
                recorder.clone(),
                db.clone(),
            )
        };

        let miner = new_miner();
        miner.on_deal_staged(42, test_cid(0)).unwrap();
        miner.on_deal_staged(42, test_cid(1)).unwrap();
        drop(miner);

        let miner = new_miner();
        miner.load_deals_awaiting_seal().unwrap();
        miner
            .on_sector_sealed(SealedSectorMetadata {
                sector_id: 42,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            recorder.events(),
            vec![Event::Sealed(test_cid(0), 42), Event::Sealed(test_cid(1), 42)]
        );

        // The resolution itself is durable as well.
        let miner = new_miner();
        miner.load_deals_awaiting_seal().unwrap();
        assert!(
            miner
                .deals_awaiting_seal()
                .snapshot()
                .successful_sectors
                .contains_key(&42)
        );
    }

    #[tokio::test]
    async fn deal_lifecycle_through_deals_store() {
        let db = Arc::new(MemoryDB::default());
        let miner = Miner::with_deals_store(config_with_price("50"), "t01000".into(), db);

        let sealed = proposal(60);
        let failed = proposal(70);
        let rejected = proposal(10);
        let sealed_cid = miner.receive_storage_proposal(&sealed).await.unwrap().proposal_cid;
        let failed_cid = miner.receive_storage_proposal(&failed).await.unwrap().proposal_cid;
        let res = miner.receive_storage_proposal(&rejected).await.unwrap();
        assert_eq!(res.state, DealState::Rejected);

        miner.on_deal_staged(1, sealed_cid).unwrap();
        miner.on_deal_staged(2, failed_cid).unwrap();
        assert_eq!(
            miner.get_deal(&sealed_cid).unwrap().unwrap().response.state,
            DealState::Staged
        );

        miner
            .on_sector_sealed(SealedSectorMetadata {
                sector_id: 1,
                comm_r: [1; 32],
                comm_d: [2; 32],
                pieces: vec![PieceMetadata {
                    piece_key: sealed.piece_ref.to_string(),
                    num_bytes: 1024,
                    piece_inclusion_proof: Some(vec![9, 9]),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap();
        miner.on_sector_failed(2, "boom").unwrap();

        let deal = miner.get_deal(&sealed_cid).unwrap().unwrap();
        assert_eq!(deal.response.state, DealState::Sealed);
        let proof_info = deal.response.proof_info.unwrap();
        assert_eq!(proof_info.sector_id, 1);
        assert_eq!(proof_info.comm_r, [1; 32]);
        assert_eq!(proof_info.piece_inclusion_proof, Some(vec![9, 9]));

        let deal = miner.get_deal(&failed_cid).unwrap().unwrap();
        assert_eq!(deal.response.state, DealState::Failed);
        assert_eq!(deal.response.message, "boom");

        let mut states = miner
            .deals_ls()
            .into_stream()
            .map(|deal| deal.unwrap().response.state.to_string())
            .collect::<Vec<_>>()
            .await;
        states.sort();
        assert_eq!(states, vec!["Failed", "Rejected", "Sealed"]);
    }

    #[test]
    fn late_staging_on_sealed_sector_is_not_regressed_to_staged() {
        let db = Arc::new(MemoryDB::default());
        let miner = Miner::with_deals_store(config_with_price("0"), "t01000".into(), db);
        let deal = proposal(1);
        let cid = futures::executor::block_on(miner.receive_storage_proposal(&deal))
            .unwrap()
            .proposal_cid;

        miner
            .on_sector_sealed(SealedSectorMetadata {
                sector_id: 9,
                ..Default::default()
            })
            .unwrap();
        miner.on_deal_staged(9, cid).unwrap();
        assert_eq!(
            miner.get_deal(&cid).unwrap().unwrap().response.state,
            DealState::Sealed
        );
    }
}
