//! Relic — a reference-counted, typed resource cache for real-time engines.
//!
//! The cache stores heterogeneous runtime assets (textures, shaders, fonts,
//! sounds, models, ...) in per-kind slot storage whose addresses never move
//! once handed out, and exposes lightweight [`ResourceRef`] handles that are
//! revalidated through the owning [`ResourcePool`] before every dereference.
//!
//! # Design
//!
//! - One [`BucketArray`] per resource kind: growth appends fixed-size buckets
//!   and never reallocates existing ones, so live payload addresses are
//!   stable for the pool's lifetime.
//! - Manual retain/release reference counting: handles are plain `Copy`
//!   values with no drop-driven ownership, because they are routinely stored
//!   in long-lived structures that outlive any lexical scope. A
//!   [`ScopedRef`] guard is provided for call sites that do have one clear
//!   scope.
//! - Deferred reclamation: an entry whose count reaches zero is only torn
//!   down after a configurable grace delay, once per frame, so release-then-
//!   reload patterns resurrect the entry instead of thrashing the backend.
//! - Single-threaded, frame-synchronous: no internal locking; all operations
//!   run on the simulation/render thread between `begin_frame` and
//!   `end_frame`.
//!
//! ```rust
//! use relic::{PoolConfig, ResourceKind, ResourcePayload, ResourcePool, TexturePayload};
//!
//! let mut pool = ResourcePool::new(PoolConfig::default());
//! pool.begin_frame(0);
//!
//! let tex = pool
//!     .create(ResourceKind::Texture, Some("ui/cursor.png"), || {
//!         Ok(ResourcePayload::Texture(TexturePayload::from_pixels(2, 2, vec![0; 16])))
//!     })
//!     .unwrap();
//!
//! assert!(pool.is_valid(tex));
//! pool.release(tex).unwrap();
//! pool.end_frame();
//! ```

pub mod bucket;
pub mod entry;
pub mod errors;
pub mod handle;
pub mod kind;
pub mod payload;
pub mod pool;
pub mod reclaim;

pub use bucket::BucketArray;
pub use entry::ResourceEntry;
pub use errors::{CacheError, FactoryError, Result};
pub use handle::{ResourceRef, ScopedRef};
pub use kind::ResourceKind;
pub use payload::{
    BackendHandle, FontPayload, ModelPayload, MusicPayload, ResourcePayload, ShaderPayload,
    SoundPayload, SpriteSheetPayload, TexturePayload, VectorImagePayload, VoxelFrameSetPayload,
};
pub use pool::{PoolConfig, ResourcePool};
pub use reclaim::{BackendError, NullBackend, ReclaimBackend, ReclaimStats};
