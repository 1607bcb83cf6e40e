//! Typed References
//!
//! Lightweight handles naming a cache entry without owning its storage.
//!
//! # Design Principles
//! - A [`ResourceRef`] is a plain `Copy` value `{pool identity, slot, id}`;
//!   it has no drop-driven ownership because handles are routinely stored in
//!   long-lived structures (model parts, UI widgets) and copied freely.
//! - Every `create`/`retain`/successful `find` must be paired with exactly
//!   one `release` by the caller.
//! - Validity is never assumed: the pool re-checks pool identity, slot bounds
//!   and the id snapshot before every dereference, so a reference to a
//!   recycled slot is detected rather than misread.
//! - [`ScopedRef`] wraps the manual model for call sites that do have one
//!   clear scope, releasing on all exit paths without changing the
//!   underlying counting model.

use crate::errors::Result;
use crate::kind::ResourceKind;
use crate::payload::ResourcePayload;
use crate::pool::ResourcePool;

/// Handle to a cache entry.
///
/// Becomes logically invalid (never dangling) once the entry is reclaimed;
/// check through [`ResourcePool::is_valid`] or let any dereference report
/// [`crate::CacheError::StaleReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub(crate) pool_id: u64,
    pub(crate) kind: ResourceKind,
    pub(crate) slot: usize,
    pub(crate) id: u64,
}

impl ResourceRef {
    /// The kind of entry this reference names.
    #[inline]
    #[must_use]
    pub fn kind(self) -> ResourceKind {
        self.kind
    }

    /// Slot index inside the kind's store. Reused after reclamation, so it
    /// identifies an entry only together with [`id`](Self::id).
    #[inline]
    #[must_use]
    pub fn slot(self) -> usize {
        self.slot
    }

    /// Id snapshot taken when the reference was issued.
    #[inline]
    #[must_use]
    pub fn id(self) -> u64 {
        self.id
    }
}

/// Releases its reference when dropped.
///
/// A thin guard over the manual retain/release model, for call sites with a
/// single lexical scope: early returns and error paths release exactly once.
/// A release that fails (already-stale reference) is logged, not propagated,
/// since drop has no error channel.
pub struct ScopedRef<'a> {
    pool: &'a mut ResourcePool,
    reference: ResourceRef,
}

impl<'a> ScopedRef<'a> {
    /// Takes over one reference's release obligation.
    pub fn new(pool: &'a mut ResourcePool, reference: ResourceRef) -> Self {
        Self { pool, reference }
    }

    /// The guarded reference. Copying it does not extend its lifetime.
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        self.reference
    }

    /// Dereferences through the owning pool.
    pub fn get(&self) -> Result<&ResourcePayload> {
        self.pool.get(self.reference)
    }

    pub fn get_mut(&mut self) -> Result<&mut ResourcePayload> {
        self.pool.get_mut(self.reference)
    }

    /// Cancels the automatic release and hands the obligation back to the
    /// caller.
    #[must_use]
    pub fn detach(self) -> ResourceRef {
        let reference = self.reference;
        std::mem::forget(self);
        reference
    }
}

impl Drop for ScopedRef<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.pool.release(self.reference) {
            log::warn!("scoped release failed: {err}");
        }
    }
}
