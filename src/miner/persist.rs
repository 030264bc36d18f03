// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use super::awaiting_seal::DealsAwaitingSeal;
use crate::db::{SettingsStore, setting_keys::DEALS_AWAITING_SEAL_KEY};
use crate::error::{Error, Result};

/// Saves and loads the [`DealsAwaitingSeal`] table under a well-known key of
/// the deals store.
pub struct DealsAwaitingSealStore<DB> {
    db: Arc<DB>,
    /// Generation of the last snapshot written; older snapshots are skipped.
    last_saved: Mutex<Option<u64>>,
}

impl<DB: SettingsStore> DealsAwaitingSealStore<DB> {
    pub fn new(db: Arc<DB>) -> Self {
        Self {
            db,
            last_saved: Mutex::new(None),
        }
    }

    pub fn save(&self, table: &DealsAwaitingSeal) -> Result<()> {
        let mut last_saved = self.last_saved.lock();
        if last_saved.is_some_and(|generation| generation >= table.generation) {
            debug!(
                generation = table.generation,
                "a newer deals-awaiting-seal snapshot is already saved"
            );
            return Ok(());
        }
        let bytes = serde_json::to_vec(table).map_err(|e| Error::StorageWrite(e.into()))?;
        self.db
            .write_bin(DEALS_AWAITING_SEAL_KEY, &bytes)
            .map_err(|e| {
                error!("failed to save deals awaiting seal: {e:#}");
                Error::StorageWrite(e)
            })?;
        *last_saved = Some(table.generation);
        Ok(())
    }

    /// Loads the saved table, or an empty one when nothing was saved yet.
    pub fn load(&self) -> Result<DealsAwaitingSeal> {
        let table = match self
            .db
            .read_bin(DEALS_AWAITING_SEAL_KEY)
            .map_err(Error::StorageRead)?
        {
            Some(bytes) => {
                serde_json::from_slice::<DealsAwaitingSeal>(&bytes).map_err(|source| {
                    Error::Decode {
                        what: "deals awaiting seal",
                        source,
                    }
                })?
            }
            None => DealsAwaitingSeal::default(),
        };
        *self.last_saved.lock() = Some(table.generation);
        Ok(table)
    }
}
