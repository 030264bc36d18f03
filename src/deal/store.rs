// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use anyhow::Context as _;
use cid::Cid;
use tracing::debug;

use super::{Deal, Response};
use crate::db::{SettingsStore, SettingsStoreExt as _, setting_keys::DEAL_RECORD_PREFIX};
use crate::utils::flume::FlumeSenderExt as _;

/// Deal records of the miner, keyed by proposal [`Cid`].
pub struct DealStore<DB> {
    db: Arc<DB>,
}

impl<DB> Clone for DealStore<DB> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

fn deal_key(proposal_cid: &Cid) -> String {
    format!("{DEAL_RECORD_PREFIX}{proposal_cid}")
}

impl<DB> DealStore<DB>
where
    DB: SettingsStore + Send + Sync + 'static,
{
    pub fn new(db: Arc<DB>) -> Self {
        Self { db }
    }

    pub fn put_deal(&self, deal: &Deal) -> anyhow::Result<()> {
        let key = deal_key(&deal.response.proposal_cid);
        debug!(%key, state = %deal.response.state, "storing deal");
        self.db.write_obj(&key, deal)
    }

    pub fn get_deal(&self, proposal_cid: &Cid) -> anyhow::Result<Option<Deal>> {
        self.db.read_obj(&deal_key(proposal_cid))
    }

    /// Replaces the response of an already stored deal, returning the updated deal.
    pub fn update_response(&self, proposal_cid: &Cid, response: Response) -> anyhow::Result<Deal> {
        let mut deal: Deal = self
            .get_deal(proposal_cid)?
            .with_context(|| format!("no deal stored for proposal {proposal_cid}"))?;
        deal.response = response;
        self.put_deal(&deal)?;
        Ok(deal)
    }

    /// Lists every stored deal, in no particular order.
    ///
    /// Deals are produced lazily on a background thread. The first error ends
    /// the sequence. The channel is closed once the listing is exhausted.
    pub fn deals_ls(&self) -> flume::Receiver<anyhow::Result<Deal>> {
        let (tx, rx) = flume::bounded(1);
        let db = self.db.clone();
        std::thread::spawn(move || {
            let keys = match db.setting_keys() {
                Ok(keys) => keys,
                Err(e) => {
                    tx.send_or_warn(Err(e));
                    return;
                }
            };
            for key in keys
                .into_iter()
                .filter(|key| key.starts_with(DEAL_RECORD_PREFIX))
            {
                let item = db
                    .require_obj::<Deal>(&key)
                    .with_context(|| format!("failed to read deal {key}"));
                let failed = item.is_err();
                if !tx.send_or_warn(item) || failed {
                    return;
                }
            }
        });
        rx
    }
}
