//! In-memory keyed store of live match state
//!
//! The store is the single source of truth consumed by presentation. It is
//! written only by the update reducer ([`MatchStore::apply`]), which both
//! the snapshot loader and the stream feed it through; readers get cloned
//! snapshots and never observe a torn record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::types::MatchRecord;

/// Outcome of applying a record to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// First sight of this match id
    Inserted,
    /// Existing entry fully replaced
    Updated,
    /// Rejected: both records carry `seq` and the incoming one is older
    Stale,
}

impl Applied {
    /// Whether the store changed
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Applied::Stale)
    }
}

/// Keyed collection of the latest known state per match
///
/// Conflict policy is last-write-wins per `id`: every record is a complete
/// snapshot of its match, so an accepted write fully replaces the stored
/// entry with no field-level merge. Entries are never evicted while the
/// store is alive; a match leaving `Live` simply stops being updated.
#[derive(Debug)]
pub struct MatchStore {
    matches: Arc<RwLock<HashMap<String, MatchRecord>>>,
    revision: Arc<AtomicU64>,
    changed_tx: watch::Sender<u64>,
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (changed_tx, _) = watch::channel(0);
        Self {
            matches: Arc::new(RwLock::new(HashMap::new())),
            revision: Arc::new(AtomicU64::new(0)),
            changed_tx,
        }
    }

    /// Apply one record under last-write-wins
    ///
    /// Total over syntactically valid records and idempotent: re-applying
    /// the same record leaves the stored entry unchanged. When both the
    /// stored and the incoming record carry a sequence number, an older
    /// incoming `seq` is rejected and the store is left untouched; equal
    /// `seq` is accepted so re-delivery stays idempotent. Records without
    /// `seq` follow pure arrival order.
    pub async fn apply(&self, record: MatchRecord) -> Applied {
        let mut matches = self.matches.write().await;
        let outcome = match matches.get(&record.id) {
            None => Applied::Inserted,
            Some(existing) => match (existing.seq, record.seq) {
                (Some(stored), Some(incoming)) if incoming < stored => Applied::Stale,
                _ => Applied::Updated,
            },
        };
        if outcome.is_accepted() {
            matches.insert(record.id.clone(), record);
            let revision = self.revision.fetch_add(1, Ordering::Relaxed) + 1;
            let _ = self.changed_tx.send(revision);
        }
        outcome
    }

    /// Latest stored record for a match id, cloned
    pub async fn get(&self, id: &str) -> Option<MatchRecord> {
        self.matches.read().await.get(id).cloned()
    }

    /// Cloned snapshot of the whole collection
    pub async fn snapshot(&self) -> HashMap<String, MatchRecord> {
        self.matches.read().await.clone()
    }

    /// Number of tracked matches
    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    /// Whether the store holds no matches
    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }

    /// Count of accepted writes since creation
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// Subscribe to revision bumps (one per accepted write)
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changed_tx.subscribe()
    }
}

impl Clone for MatchStore {
    fn clone(&self) -> Self {
        Self {
            matches: Arc::clone(&self.matches),
            revision: Arc::clone(&self.revision),
            changed_tx: self.changed_tx.clone(),
        }
    }
}
