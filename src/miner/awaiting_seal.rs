// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use ahash::{HashMap, HashSet};
use cid::Cid;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::shim::sector::{SealedSectorMetadata, SectorId};

/// Receives the outcome of sealing for every deal staged into a sector.
///
/// Implementations are called without the tracker lock held, but must not
/// block for long: resolution of a sector notifies its deals one after the other.
pub trait SealNotifier: Send + Sync {
    fn on_success(&self, deal: &Cid, sector: &SealedSectorMetadata);
    fn on_failure(&self, deal: &Cid, reason: &str);
}

#[derive(Debug, Clone, PartialEq)]
enum Notification {
    Sealed(Cid, Arc<SealedSectorMetadata>),
    Failed(Cid, Arc<str>),
}

impl Notification {
    fn deliver(&self, notifier: &dyn SealNotifier) {
        match self {
            Notification::Sealed(deal, sector) => notifier.on_success(deal, sector),
            Notification::Failed(deal, reason) => notifier.on_failure(deal, reason),
        }
    }
}

/// Correlation table between sectors and the deals staged into them.
///
/// A sector has at most one terminal record, in either `successful_sectors`
/// or `failed_sectors`, and keeps it for good.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealsAwaitingSeal {
    pub sectors_to_deals: HashMap<SectorId, Vec<Cid>>,
    pub successful_sectors: HashMap<SectorId, Arc<SealedSectorMetadata>>,
    pub failed_sectors: HashMap<SectorId, Arc<str>>,
    /// Resolved sectors that already notified a deal registered after resolution.
    pub late_registrations: HashSet<SectorId>,
    /// Bumped on every mutation; lets the persistence layer discard stale snapshots.
    pub generation: u64,
}

impl DealsAwaitingSeal {
    fn add(&mut self, sector_id: SectorId, deal: Cid) -> Option<Notification> {
        self.generation += 1;
        let terminal = if let Some(sector) = self.successful_sectors.get(&sector_id) {
            Some(Notification::Sealed(deal, sector.clone()))
        } else {
            self.failed_sectors
                .get(&sector_id)
                .map(|reason| Notification::Failed(deal, reason.clone()))
        };
        match terminal {
            // Only the first deal registered after resolution is notified. Any
            // further deal is parked in the pending list and never hears back.
            // TODO: notify every late deal once downstream deal handling no
            // longer relies on this.
            Some(notification) if self.late_registrations.insert(sector_id) => {
                debug!(sector_id, %deal, "deal registered against resolved sector");
                Some(notification)
            }
            Some(_) => {
                warn!(
                    sector_id,
                    %deal,
                    "sector already resolved and notified a late deal, deal will not be notified"
                );
                self.sectors_to_deals.entry(sector_id).or_default().push(deal);
                None
            }
            None => {
                debug!(sector_id, %deal, "deal awaiting seal");
                self.sectors_to_deals.entry(sector_id).or_default().push(deal);
                None
            }
        }
    }

    fn pending(&self, sector_id: SectorId) -> &[Cid] {
        self.sectors_to_deals
            .get(&sector_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn success(&mut self, sector: SealedSectorMetadata) -> Vec<Notification> {
        let sector_id = sector.sector_id;
        if self.failed_sectors.contains_key(&sector_id) {
            warn!(sector_id, "ignoring seal success for a sector that already failed");
            return vec![];
        }
        if self.successful_sectors.contains_key(&sector_id) {
            warn!(sector_id, "sector reported sealed twice");
        }
        self.generation += 1;
        let sector = Arc::new(sector);
        self.successful_sectors.insert(sector_id, sector.clone());
        self.pending(sector_id)
            .iter()
            .map(|deal| Notification::Sealed(*deal, sector.clone()))
            .collect()
    }

    fn fail(&mut self, sector_id: SectorId, reason: &str) -> Vec<Notification> {
        if self.successful_sectors.contains_key(&sector_id) {
            warn!(sector_id, "ignoring seal failure for a sector that already sealed");
            return vec![];
        }
        if self.failed_sectors.contains_key(&sector_id) {
            warn!(sector_id, "sector reported failed twice");
        }
        self.generation += 1;
        let reason: Arc<str> = reason.into();
        self.failed_sectors.insert(sector_id, reason.clone());
        self.pending(sector_id)
            .iter()
            .map(|deal| Notification::Failed(*deal, reason.clone()))
            .collect()
    }
}

/// Thread-safe [`DealsAwaitingSeal`] that notifies deals as their sectors resolve.
///
/// Notifications are computed under the lock and delivered after releasing
/// it, in registration order for a given resolution.
pub struct SealTracker {
    table: Mutex<DealsAwaitingSeal>,
    notifier: Arc<dyn SealNotifier>,
}

impl SealTracker {
    pub fn new(notifier: Arc<dyn SealNotifier>) -> Self {
        Self::with_table(DealsAwaitingSeal::default(), notifier)
    }

    pub fn with_table(table: DealsAwaitingSeal, notifier: Arc<dyn SealNotifier>) -> Self {
        Self {
            table: Mutex::new(table),
            notifier,
        }
    }

    /// Records that `deal` was staged into `sector_id`.
    pub fn register(&self, sector_id: SectorId, deal: Cid) {
        let notification = self.table.lock().add(sector_id, deal);
        if let Some(notification) = notification {
            notification.deliver(self.notifier.as_ref());
        }
    }

    /// Records that `sector` sealed and notifies every deal staged into it.
    pub fn resolve_success(&self, sector: SealedSectorMetadata) {
        let notifications = self.table.lock().success(sector);
        self.deliver(notifications);
    }

    /// Records that `sector_id` failed to seal and notifies every deal staged into it.
    pub fn resolve_failure(&self, sector_id: SectorId, reason: &str) {
        let notifications = self.table.lock().fail(sector_id, reason);
        self.deliver(notifications);
    }

    fn deliver(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            notification.deliver(self.notifier.as_ref());
        }
    }

    /// Consistent copy of the table, suitable for persisting.
    pub fn snapshot(&self) -> DealsAwaitingSeal {
        self.table.lock().clone()
    }

    /// Replaces the table, e.g. with one loaded at start-up.
    pub fn restore(&self, table: DealsAwaitingSeal) {
        *self.table.lock() = table;
    }

    pub fn pending_deals(&self, sector_id: SectorId) -> Vec<Cid> {
        self.table.lock().pending(sector_id).to_vec()
    }
}
