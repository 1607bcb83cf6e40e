//! Reclamation Scheduler
//!
//! Once per frame, after all other cache mutations, the pool sweeps every
//! kind's store for entries that are unreferenced and past the grace delay,
//! releases their backend objects and clears the slots for reuse.
//!
//! The grace delay exists because resources are frequently released and
//! immediately re-requested (e.g. reloading the same texture on a state
//! transition); deferring teardown lets such entries be resurrected instead
//! of thrashing scarce backend objects.
//!
//! Teardown failures are logged and the slot still becomes empty: a stuck
//! slot would leak both the slot and its backend object, so forward progress
//! wins over strict error propagation here.

use thiserror::Error;

use crate::bucket::BucketArray;
use crate::entry::ResourceEntry;
use crate::kind::ResourceKind;
use crate::payload::ResourcePayload;

/// Error reported by a backend while releasing a payload's objects.
///
/// Never crosses the pool boundary; see the module docs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl From<&str> for BackendError {
    fn from(msg: &str) -> Self {
        BackendError(msg.to_owned())
    }
}

/// The seam through which kind-specific backend objects are released.
///
/// The renderer and audio mixer implement this over their own device
/// handles; payload CPU buffers are freed by the entry itself when the slot
/// clears.
pub trait ReclaimBackend {
    /// Releases whatever backend objects `payload` still holds.
    fn release(
        &mut self,
        kind: ResourceKind,
        id: u64,
        payload: &mut ResourcePayload,
    ) -> Result<(), BackendError>;
}

/// Backend for pools holding pure CPU payloads, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl ReclaimBackend for NullBackend {
    fn release(
        &mut self,
        _kind: ResourceKind,
        _id: u64,
        _payload: &mut ResourcePayload,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Outcome of one frame's reclamation sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimStats {
    /// Filled entries examined.
    pub scanned: usize,
    /// Entries cleared back to empty.
    pub reclaimed: usize,
    /// Backend releases that reported an error (slots were still cleared).
    pub teardown_failures: usize,
}

/// Sweeps one kind's store, clearing every reclaim-eligible entry.
pub(crate) fn sweep_kind(
    kind: ResourceKind,
    entries: &mut BucketArray<ResourceEntry>,
    now_ms: u64,
    free_delay_ms: u64,
    backend: &mut dyn ReclaimBackend,
    stats: &mut ReclaimStats,
) {
    for entry in entries.iter_mut() {
        if entry.is_empty() {
            continue;
        }
        stats.scanned += 1;
        if !entry.reclaim_eligible(now_ms, free_delay_ms) {
            continue;
        }

        let id = entry.id();
        if let Some(mut payload) = entry.clear() {
            if let Err(err) = backend.release(kind, id, &mut payload) {
                stats.teardown_failures += 1;
                log::error!("backend teardown failed for {kind:?} id {id}: {err}");
            }
        }
        stats.reclaimed += 1;
        log::debug!("reclaimed {kind:?} id {id} at {now_ms}ms");
    }
}
