//! Resource Pool
//!
//! Owns one [`BucketArray`] of entries per resource kind, the per-kind id
//! counters, the frame clock and the reclamation policy, and exposes the
//! create/retain/release/find/dereference surface collaborators use.
//!
//! # Frame protocol
//!
//! All operations run on the simulation/render thread. The embedding engine
//! calls [`ResourcePool::begin_frame`] with the current engine time before
//! the frame's cache traffic and [`ResourcePool::end_frame`] after it; the
//! reclamation sweep runs exactly once per frame, inside `end_frame`, so an
//! entry released and re-requested within one frame is never torn down in
//! between.
//!
//! # Identity
//!
//! Each pool instance gets a process-unique identity, stamped into every
//! reference it issues. A reference can therefore never validate against a
//! pool that did not issue it, including a successor pool created after an
//! engine restart.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::bucket::BucketArray;
use crate::entry::ResourceEntry;
use crate::errors::{CacheError, FactoryError, Result};
use crate::handle::{ResourceRef, ScopedRef};
use crate::kind::{KIND_COUNT, ResourceKind};
use crate::payload::ResourcePayload;
use crate::reclaim::{self, NullBackend, ReclaimBackend, ReclaimStats};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Pool construction parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Grace delay (ms) a zero-refcount entry must sit untouched before it
    /// becomes reclaim-eligible. Pool-wide, not per entry.
    pub free_delay_ms: u64,
    /// Slots per storage bucket.
    pub bucket_capacity: usize,
    /// Upper bound on total slots per kind; `usize::MAX` for unlimited.
    pub max_slots_per_kind: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            free_delay_ms: 500,
            bucket_capacity: crate::bucket::DEFAULT_BUCKET_CAPACITY,
            max_slots_per_kind: usize::MAX,
        }
    }
}

/// Per-kind storage plus its monotonic id counter.
#[derive(Debug)]
struct KindStore {
    entries: BucketArray<ResourceEntry>,
    /// Next id to issue; starts at 1, never resets, never reissues 0.
    next_id: u64,
}

impl KindStore {
    fn new(config: &PoolConfig) -> Self {
        Self {
            entries: BucketArray::with_limits(config.bucket_capacity, config.max_slots_per_kind),
            next_id: 1,
        }
    }
}

/// The typed resource cache.
///
/// Passed explicitly to collaborators (renderer, audio mixer, UI) rather
/// than living behind an engine singleton, so it is testable in isolation.
pub struct ResourcePool {
    pool_id: u64,
    config: PoolConfig,
    stores: [KindStore; KIND_COUNT],
    backend: Box<dyn ReclaimBackend>,
    now_ms: u64,
}

impl ResourcePool {
    /// Pool with no backend objects to release (pure CPU payloads).
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self::with_backend(config, Box::new(NullBackend))
    }

    /// Pool whose reclamation sweep releases backend objects through
    /// `backend`.
    #[must_use]
    pub fn with_backend(config: PoolConfig, backend: Box<dyn ReclaimBackend>) -> Self {
        Self {
            pool_id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            stores: std::array::from_fn(|_| KindStore::new(&config)),
            config,
            backend,
            now_ms: 0,
        }
    }

    /// Process-unique identity of this pool instance.
    #[inline]
    #[must_use]
    pub fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// Current engine time as of the last `begin_frame`.
    #[inline]
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The configured grace delay.
    #[inline]
    #[must_use]
    pub fn free_delay_ms(&self) -> u64 {
        self.config.free_delay_ms
    }

    // ========================================================================
    // Frame protocol
    // ========================================================================

    /// Advances the frame clock. The clock is monotonic: a regressed
    /// timestamp is clamped and logged rather than honored, since timestamps
    /// feed reclamation eligibility.
    pub fn begin_frame(&mut self, now_ms: u64) {
        if now_ms < self.now_ms {
            log::warn!(
                "frame clock regressed ({now_ms}ms < {}ms), clamping",
                self.now_ms
            );
            return;
        }
        self.now_ms = now_ms;
    }

    /// Runs the reclamation sweep for this frame: every filled entry with a
    /// zero reference count that aged past the grace delay has its backend
    /// objects released and its slot cleared for reuse.
    ///
    /// Call once per frame, after all other cache mutations.
    pub fn end_frame(&mut self) -> ReclaimStats {
        let mut stats = ReclaimStats::default();
        for kind in ResourceKind::ALL {
            reclaim::sweep_kind(
                kind,
                &mut self.stores[kind.index()].entries,
                self.now_ms,
                self.config.free_delay_ms,
                self.backend.as_mut(),
                &mut stats,
            );
        }
        if stats.reclaimed > 0 {
            log::debug!(
                "reclaim sweep: {} reclaimed / {} scanned",
                stats.reclaimed,
                stats.scanned
            );
        }
        stats
    }

    // ========================================================================
    // Creation & lookup
    // ========================================================================

    /// Creates a resource of `kind`, reusing a reclaimed slot when one
    /// exists, and returns a reference with an initial count of 1.
    ///
    /// The factory runs after the slot and id are committed; if it fails the
    /// slot is left empty (the consumed id is never reissued) and the error
    /// is returned — the caller decides whether to retry, substitute a
    /// placeholder, or propagate.
    pub fn create<F>(
        &mut self,
        kind: ResourceKind,
        source_path: Option<&str>,
        factory: F,
    ) -> Result<ResourceRef>
    where
        F: FnOnce() -> std::result::Result<ResourcePayload, FactoryError>,
    {
        let now_ms = self.now_ms;
        let store = &mut self.stores[kind.index()];

        let slot = match (0..store.entries.len())
            .find(|&i| store.entries.get(i).is_some_and(ResourceEntry::is_empty))
        {
            Some(reused) => {
                log::debug!("reusing {kind:?} slot {reused}");
                reused
            }
            None => store.entries.push(ResourceEntry::default()).ok_or_else(|| {
                log::error!(
                    "slot allocation exhausted for {kind:?} ({} slots)",
                    store.entries.max_slots()
                );
                CacheError::AllocationExhausted {
                    kind,
                    limit: store.entries.max_slots(),
                }
            })?,
        };

        let id = store.next_id;
        store.next_id += 1;

        let payload = match factory() {
            Ok(payload) if payload.kind() == kind => payload,
            Ok(payload) => {
                // Slot stays empty; the id stays consumed.
                return Err(CacheError::FactoryFailed {
                    kind,
                    source: FactoryError(format!(
                        "factory produced a {:?} payload",
                        payload.kind()
                    )),
                });
            }
            Err(source) => {
                return Err(CacheError::FactoryFailed { kind, source });
            }
        };

        let entry = store
            .entries
            .get_mut(slot)
            .unwrap_or_else(|| unreachable!("slot {slot} was just acquired"));
        entry.fill(id, source_path.map(str::to_owned), payload, now_ms);

        Ok(ResourceRef {
            pool_id: self.pool_id,
            kind,
            slot,
            id,
        })
    }

    /// Finds a filled entry of `kind` loaded from `path`, retaining it on
    /// success so a subsequent unconditional `release` is always correct
    /// (get-or-create semantics). Resurrects entries inside the grace
    /// window.
    pub fn find(&mut self, kind: ResourceKind, path: &str) -> Result<ResourceRef> {
        let now_ms = self.now_ms;
        let store = &mut self.stores[kind.index()];

        let slot = (0..store.entries.len())
            .find(|&i| {
                store
                    .entries
                    .get(i)
                    .is_some_and(|e| !e.is_empty() && e.source_path() == Some(path))
            })
            .ok_or_else(|| CacheError::NotFound {
                kind,
                path: path.to_owned(),
            })?;

        let entry = store
            .entries
            .get_mut(slot)
            .unwrap_or_else(|| unreachable!("slot {slot} was just matched"));
        entry.bump_ref(now_ms);

        Ok(ResourceRef {
            pool_id: self.pool_id,
            kind,
            slot,
            id: entry.id(),
        })
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Adds one reference. Calling this with a stale reference is a caller
    /// bug (use-after-invalidation) and is reported, never ignored.
    pub fn retain(&mut self, reference: ResourceRef) -> Result<()> {
        let now_ms = self.now_ms;
        let entry = self.live_entry_mut(reference)?;
        entry.bump_ref(now_ms);
        Ok(())
    }

    /// Drops one reference. Reaching zero does not free the payload; it only
    /// makes the entry reclaim-eligible once the grace delay elapses.
    pub fn release(&mut self, reference: ResourceRef) -> Result<()> {
        let now_ms = self.now_ms;
        let entry = self.live_entry_mut(reference)?;
        if !entry.drop_ref(now_ms) {
            return Err(CacheError::UnbalancedRelease { reference });
        }
        Ok(())
    }

    /// Wraps `reference` in a guard that releases it on drop.
    pub fn scoped(&mut self, reference: ResourceRef) -> ScopedRef<'_> {
        ScopedRef::new(self, reference)
    }

    // ========================================================================
    // Validation & dereference
    // ========================================================================

    /// Whether `reference` still names a live entry: pool identity, slot and
    /// id snapshot must all match. Slot indices are reused, so the id check
    /// is what detects references into recycled slots.
    #[must_use]
    pub fn is_valid(&self, reference: ResourceRef) -> bool {
        reference.pool_id == self.pool_id
            && reference.id != 0
            && self.stores[reference.kind.index()]
                .entries
                .get(reference.slot)
                .is_some_and(|e| e.id() == reference.id)
    }

    /// The entry behind `reference`, for inspection.
    pub fn entry(&self, reference: ResourceRef) -> Result<&ResourceEntry> {
        if !self.is_valid(reference) {
            return Err(CacheError::StaleReference { reference });
        }
        self.stores[reference.kind.index()]
            .entries
            .get(reference.slot)
            .ok_or(CacheError::StaleReference { reference })
    }

    /// Dereferences to the payload. The returned address is identical across
    /// calls for as long as the entry stays filled, even while unrelated
    /// creates grow the storage.
    pub fn get(&self, reference: ResourceRef) -> Result<&ResourcePayload> {
        self.entry(reference)?
            .payload()
            .ok_or(CacheError::StaleReference { reference })
    }

    /// Mutable dereference to the payload.
    pub fn get_mut(&mut self, reference: ResourceRef) -> Result<&mut ResourcePayload> {
        self.live_entry_mut(reference)?
            .payload_mut()
            .ok_or(CacheError::StaleReference { reference })
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Number of filled entries of `kind`.
    #[must_use]
    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.stores[kind.index()]
            .entries
            .iter()
            .filter(|e| !e.is_empty())
            .count()
    }

    /// Total slots ever allocated for `kind`, filled or not.
    #[must_use]
    pub fn slot_count(&self, kind: ResourceKind) -> usize {
        self.stores[kind.index()].entries.len()
    }

    /// The id the next successful or failed `create` of `kind` will consume.
    #[must_use]
    pub fn next_id(&self, kind: ResourceKind) -> u64 {
        self.stores[kind.index()].next_id
    }

    /// Approximate CPU-side bytes held by filled entries of `kind`.
    #[must_use]
    pub fn payload_bytes(&self, kind: ResourceKind) -> usize {
        self.stores[kind.index()]
            .entries
            .iter()
            .filter_map(ResourceEntry::payload)
            .map(ResourcePayload::byte_size)
            .sum()
    }

    fn live_entry_mut(&mut self, reference: ResourceRef) -> Result<&mut ResourceEntry> {
        if !self.is_valid(reference) {
            return Err(CacheError::StaleReference { reference });
        }
        self.stores[reference.kind.index()]
            .entries
            .get_mut(reference.slot)
            .ok_or(CacheError::StaleReference { reference })
    }
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("pool_id", &self.pool_id)
            .field("now_ms", &self.now_ms)
            .field("free_delay_ms", &self.config.free_delay_ms)
            .finish_non_exhaustive()
    }
}

macro_rules! impl_kind_diagnostics {
    ($(($variant:ident, $snake:ident)),* $(,)?) => {
        paste::paste! {
            impl ResourcePool {
                $(
                    #[doc = concat!("Number of live `", stringify!($variant), "` entries.")]
                    #[must_use]
                    pub fn [<$snake _live_count>](&self) -> usize {
                        self.live_count(ResourceKind::$variant)
                    }

                    #[doc = concat!("Next id the `", stringify!($variant), "` store will issue.")]
                    #[must_use]
                    pub fn [<$snake _next_id>](&self) -> u64 {
                        self.next_id(ResourceKind::$variant)
                    }
                )*
            }
        }
    };
}

crate::for_each_resource_kind!(impl_kind_diagnostics);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{SoundPayload, TexturePayload};

    fn texture() -> std::result::Result<ResourcePayload, FactoryError> {
        Ok(ResourcePayload::Texture(TexturePayload::from_pixels(
            1,
            1,
            vec![0; 4],
        )))
    }

    #[test]
    fn create_assigns_monotonic_ids_per_kind() {
        let mut pool = ResourcePool::new(PoolConfig::default());
        let a = pool.create(ResourceKind::Texture, None, texture).unwrap();
        let b = pool.create(ResourceKind::Texture, None, texture).unwrap();
        let c = pool
            .create(ResourceKind::Sound, None, || {
                Ok(ResourcePayload::Sound(SoundPayload::default()))
            })
            .unwrap();

        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(c.id(), 1, "counters are per kind");
        assert_eq!(pool.texture_next_id(), 3);
        assert_eq!(pool.sound_next_id(), 2);
    }

    #[test]
    fn factory_failure_rolls_the_slot_back() {
        let mut pool = ResourcePool::new(PoolConfig::default());
        let err = pool
            .create(ResourceKind::Texture, Some("bad.png"), || {
                Err(FactoryError::from("malformed file"))
            })
            .unwrap_err();

        assert!(matches!(err, CacheError::FactoryFailed { .. }));
        assert_eq!(pool.texture_live_count(), 0);
        // The failed create consumed an id; the slot it touched is reusable.
        assert_eq!(pool.texture_next_id(), 2);

        let ok = pool.create(ResourceKind::Texture, None, texture).unwrap();
        assert_eq!(ok.slot(), 0, "empty slot reused");
        assert_eq!(ok.id(), 2);
    }

    #[test]
    fn kind_mismatched_factory_output_is_a_factory_failure() {
        let mut pool = ResourcePool::new(PoolConfig::default());
        let err = pool
            .create(ResourceKind::Shader, None, || {
                Ok(ResourcePayload::Sound(SoundPayload::default()))
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CacheError::FactoryFailed {
                kind: ResourceKind::Shader,
                ..
            }
        ));
        assert_eq!(pool.shader_live_count(), 0);
    }

    #[test]
    fn references_from_another_pool_never_validate() {
        let mut a = ResourcePool::new(PoolConfig::default());
        let b = ResourcePool::new(PoolConfig::default());
        let r = a.create(ResourceKind::Texture, None, texture).unwrap();

        assert!(a.is_valid(r));
        assert!(!b.is_valid(r));
        assert!(matches!(
            b.get(r),
            Err(CacheError::StaleReference { .. })
        ));
    }

    #[test]
    fn begin_frame_clamps_regressed_clock() {
        let mut pool = ResourcePool::new(PoolConfig::default());
        pool.begin_frame(1000);
        pool.begin_frame(400);
        assert_eq!(pool.now_ms(), 1000);
    }

    #[test]
    fn scoped_guard_releases_on_drop() {
        let mut pool = ResourcePool::new(PoolConfig::default());
        let r = pool.create(ResourceKind::Texture, None, texture).unwrap();
        pool.retain(r).unwrap();

        {
            let guard = pool.scoped(r);
            assert!(guard.get().is_ok());
        }
        assert_eq!(pool.entry(r).unwrap().ref_count(), 1);

        {
            let guard = pool.scoped(r);
            let detached = guard.detach();
            assert_eq!(detached, r);
        }
        // detach handed the obligation back; count unchanged.
        assert_eq!(pool.entry(r).unwrap().ref_count(), 1);
    }
}
