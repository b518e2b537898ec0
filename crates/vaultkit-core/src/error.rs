//! Shared error taxonomy for the vaultkit workspace.
//!
//! Everything here surfaces synchronously: this layer performs no I/O in
//! its core paths, so there are no transient failures and no retries.
//! Document loading at the edges uses `anyhow` instead (see `io`).

use crate::felt::Felt;
use thiserror::Error;

/// Errors produced by registry validation, leaf resolution, proof
/// derivation, parameter encoding, and batch compilation.
#[derive(Debug, Error)]
pub enum Error {
    /// No committed leaf satisfies the requested action.
    #[error("action not authorized: {detail}")]
    ActionNotAuthorized {
        /// What was asked for.
        detail: String,
    },

    /// More than one committed leaf satisfies the requested action.
    ///
    /// Near-duplicate registry entries must be disambiguated by the
    /// caller; silently taking the first match could authorize the
    /// wrong fixed-argument leaf.
    #[error("ambiguous authorization: {matches} leaves satisfy {detail}")]
    AmbiguousAuthorization {
        /// How many leaves matched.
        matches: usize,
        /// What was asked for.
        detail: String,
    },

    /// The leaf commitment is absent from layer 0 of the tree.
    #[error("leaf commitment {commitment} not found at layer 0 of the tree")]
    LeafNotFound {
        /// The commitment that was looked up.
        commitment: Felt,
    },

    /// A node has no sibling at some layer during proof derivation.
    #[error("no sibling for index {index} at layer {layer}")]
    SiblingMissing {
        /// Layer at which the walk stalled.
        layer: usize,
        /// Index whose sibling is out of range.
        index: usize,
    },

    /// The layered tree violates a structural invariant.
    #[error("malformed tree: {detail}")]
    MalformedTree {
        /// Which invariant failed.
        detail: String,
    },

    /// A numeric value is outside its representable range or malformed.
    #[error("invalid parameter: {detail}")]
    InvalidParameter {
        /// What was wrong with the value.
        detail: String,
    },

    /// Zero operations were submitted for batch compilation.
    #[error("empty batch: at least one operation is required")]
    EmptyBatch,
}

/// Result alias used across the workspace's core paths.
pub type Result<T> = std::result::Result<T, Error>;
