// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Platform Types
//!
//! The foundational library of the state transition rule engine: identifiers, data
//! contracts, identities, documents, the six state transition kinds, the consensus
//! error taxonomy and the validation result they are reported in.
//!
//! ## Architectural Role
//!
//! Every other crate of the workspace depends on `platform-types`, and it depends on
//! none of them. Collaborator traits live in `platform-api`; rules live in
//! `platform-validation`.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::ProtocolError> = std::result::Result<T, E>;

/// Identifiers, identities, data contracts, documents and state transitions.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical data.
pub mod codec;
/// Validation engine configuration.
pub mod config;
/// The consensus error taxonomy and engine faults.
pub mod error;
/// A prelude containing useful extension traits like `OptionExt`.
pub mod prelude;
/// A typed tree for the JSON Schema subset used by document schemas.
pub mod schema;
/// The validation result and its builder.
pub mod validation;
