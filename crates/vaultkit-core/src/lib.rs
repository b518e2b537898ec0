//! vaultkit-core: canonical types, registry documents, and I/O.
//!
//! This crate defines the **stable boundary** used across vaultkit crates:
//! - field-element and fixed-width integer values ([`Felt`], [`Uint256`],
//!   [`Signed256`]),
//! - the read-only registry document ([`Registry`], [`LeafSpec`],
//!   [`TreeLayers`]),
//! - resolved [`Operation`]s and the aggregate [`Invocation`] payload, and
//! - JSON/CBOR I/O with extension auto-detection.
//!
//! The compiler logic itself lives in `vaultkit-merkle` (hashing, proofs)
//! and `vaultkit-compile` (resolution, encoding, batching).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Shared error taxonomy.
pub mod error;
/// Field elements and 256-bit magnitudes.
pub mod felt;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// Resolved operations and invocation payloads.
pub mod operation;
/// Registry document types.
pub mod registry;
/// Validated layered tree representation.
pub mod tree;

pub use error::{Error, Result};
pub use felt::{Felt, Signed256, Uint256};
pub use operation::{Invocation, Operation, Proof};
pub use registry::{LeafSpec, Registry, RegistryMetadata};
pub use tree::TreeLayers;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use vaultkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::felt::{Felt, Signed256, Uint256};
    pub use crate::operation::{Invocation, Operation, Proof};
    pub use crate::registry::{LeafSpec, Registry, RegistryMetadata};
    pub use crate::tree::TreeLayers;
}
