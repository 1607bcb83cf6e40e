//! Resource Entries
//!
//! The logical content of one slot: identity, reference count, timestamps and
//! the kind-specific payload. Entries are stored inline in a
//! [`crate::bucket::BucketArray`], one array per kind, so a filled entry's
//! address is stable until pool shutdown.
//!
//! Slot state is encoded structurally: `id == 0` with no payload means the
//! slot is empty; a non-zero id always has a payload. Ids are assigned
//! monotonically per kind and never reissued, which is what lets stale
//! references to a recycled slot be detected.

use crate::payload::ResourcePayload;

/// One slot's logical content.
#[derive(Debug, Default)]
pub struct ResourceEntry {
    id: u64,
    ref_count: u64,
    last_ref_change_ms: u64,
    source_path: Option<String>,
    payload: Option<ResourcePayload>,
}

impl ResourceEntry {
    /// Whether this slot is currently unfilled.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }

    /// Unique id within this kind's store; 0 for an empty slot.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Count of live references to this entry.
    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> u64 {
        self.ref_count
    }

    /// Engine time (ms) of the last reference-count change.
    #[inline]
    #[must_use]
    pub fn last_ref_change_ms(&self) -> u64 {
        self.last_ref_change_ms
    }

    /// Where the payload was loaded from, if it came from an asset source.
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// The payload, if the slot is filled.
    #[must_use]
    pub fn payload(&self) -> Option<&ResourcePayload> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut ResourcePayload> {
        self.payload.as_mut()
    }

    /// Fills an empty slot with a fresh entry at reference count 1.
    pub(crate) fn fill(
        &mut self,
        id: u64,
        source_path: Option<String>,
        payload: ResourcePayload,
        now_ms: u64,
    ) {
        debug_assert!(self.is_empty(), "fill on an occupied slot");
        debug_assert_ne!(id, 0, "id 0 is reserved for empty slots");
        self.id = id;
        self.ref_count = 1;
        self.last_ref_change_ms = now_ms;
        self.source_path = source_path;
        self.payload = Some(payload);
    }

    /// Clears the slot back to empty, returning the payload for teardown.
    pub(crate) fn clear(&mut self) -> Option<ResourcePayload> {
        self.id = 0;
        self.ref_count = 0;
        self.source_path = None;
        self.payload.take()
    }

    pub(crate) fn bump_ref(&mut self, now_ms: u64) {
        self.ref_count += 1;
        self.last_ref_change_ms = now_ms;
    }

    /// Drops one reference. Returns `false` if the count was already zero
    /// (the counter is left untouched; it never wraps).
    pub(crate) fn drop_ref(&mut self, now_ms: u64) -> bool {
        if self.ref_count == 0 {
            return false;
        }
        self.ref_count -= 1;
        self.last_ref_change_ms = now_ms;
        true
    }

    /// Whether this entry may be reclaimed at `now_ms`: filled, unreferenced,
    /// and past the grace delay since the last reference change.
    #[must_use]
    pub fn reclaim_eligible(&self, now_ms: u64, free_delay_ms: u64) -> bool {
        !self.is_empty()
            && self.ref_count == 0
            && now_ms.saturating_sub(self.last_ref_change_ms) >= free_delay_ms
    }
}
