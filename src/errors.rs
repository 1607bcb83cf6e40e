//! Error Types
//!
//! This module defines the error types used throughout the cache.
//!
//! # Overview
//!
//! The main error type [`CacheError`] covers all failure modes including:
//! - Slot allocation exhaustion
//! - Payload factory failures
//! - Stale-handle and unbalanced-release contract violations
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, CacheError>`. Contract violations are reported as
//! explicit `Err` values and never silently swallowed; reclamation teardown
//! failures are the one exception, logged locally and never propagated (see
//! [`crate::reclaim`]).

use thiserror::Error;

use crate::handle::ResourceRef;
use crate::kind::ResourceKind;

/// Error reported by a payload factory during [`crate::pool::ResourcePool::create`].
///
/// Factories are external collaborators (asset decoders, backend uploaders),
/// so their failure reason is carried as a plain message rather than a closed
/// enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FactoryError(pub String);

impl From<&str> for FactoryError {
    fn from(msg: &str) -> Self {
        FactoryError(msg.to_owned())
    }
}

impl From<String> for FactoryError {
    fn from(msg: String) -> Self {
        FactoryError(msg)
    }
}

/// The main error type for the resource cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    // ========================================================================
    // Resource exhaustion
    // ========================================================================
    /// The per-kind slot limit was reached; no new entry can be allocated.
    ///
    /// A resource-starved engine cannot safely continue rendering, so callers
    /// normally treat this as fatal; existing entries remain intact.
    #[error("slot allocation exhausted for {kind:?} (limit: {limit} slots)")]
    AllocationExhausted {
        /// The kind whose storage is full
        kind: ResourceKind,
        /// The configured slot limit
        limit: usize,
    },

    // ========================================================================
    // Recoverable creation failures
    // ========================================================================
    /// The payload factory failed; the slot was rolled back to empty.
    #[error("payload factory failed for {kind:?}: {source}")]
    FactoryFailed {
        /// The kind being created
        kind: ResourceKind,
        /// The factory's reported reason
        source: FactoryError,
    },

    // ========================================================================
    // Contract violations
    // ========================================================================
    /// The reference does not name a live entry: the pool identity, slot or
    /// id snapshot no longer match. Indicates a use-after-invalidation bug in
    /// the caller.
    #[error("stale reference: {reference:?}")]
    StaleReference {
        /// The offending reference
        reference: ResourceRef,
    },

    /// `release` was called on an entry whose count is already zero.
    /// Indicates unbalanced retain/release pairing; the counter never wraps.
    #[error("unbalanced release: {reference:?} already has a zero reference count")]
    UnbalancedRelease {
        /// The offending reference
        reference: ResourceRef,
    },

    // ========================================================================
    // Lookup failures
    // ========================================================================
    /// No filled entry of the kind matches the requested source path.
    #[error("no {kind:?} entry found for source path {path:?}")]
    NotFound {
        /// The kind searched
        kind: ResourceKind,
        /// The source path searched for
        path: String,
    },
}

/// Alias for `Result<T, CacheError>`.
pub type Result<T> = std::result::Result<T, CacheError>;
