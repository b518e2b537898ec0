// crates/vaultkit-compile/src/lib.rs

//! The Merkle-authorization compiler.
//!
//! Turns a semantic action request against a managed vault into a
//! cryptographically verifiable call: resolve the request to the single
//! pre-authorized leaf it corresponds to, derive the leaf's inclusion
//! proof against the committed tree, encode the variable parameters
//! into the exact slot layout the on-chain decoder expects, and batch
//! the resolved operations into one positionally aligned invocation.
//!
//! Everything here is pure, synchronous computation over a read-only
//! [`vaultkit_core::Registry`]; signing, broadcast, and verification
//! belong to external collaborators.

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

/// Batch compilation into the aggregate invocation.
pub mod batch;
/// The per-action compiler façade.
pub mod compiler;
/// Per-family calldata encoders and the shared slot builder.
pub mod encode;
/// Request documents for file-driven batches.
pub mod request;
/// Typed leaf matchers and resolution.
pub mod resolve;

pub use batch::{compile_batch, MANAGE_ENTRY_POINT};
pub use compiler::{ops, ApprovalSpec, VaultCompiler};
pub use encode::{ByteArray, Calldata};
pub use request::{compile_requests, ActionRequest};
pub use resolve::{resolve, LeafMatcher};
