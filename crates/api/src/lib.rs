// Path: crates/api/src/lib.rs

//! # Platform API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Platform API
//!
//! The collaborator interfaces of the rule engine. Validators only ever see chain
//! state, schema evaluation and signature verification through these traits, so
//! nodes and clients can plug in their own backends.

/// Hash-signature verification.
pub mod crypto;
/// Re-exports the error types from the central `platform-types` crate.
pub mod error;
/// The pluggable structural (JSON Schema) validator.
pub mod schema;
/// Read access to committed chain state.
pub mod state;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::crypto::{CryptoError, HashSignatureVerifier};
    pub use crate::error::{ConsensusError, ErrorCode, ProtocolError, RepositoryError};
    pub use crate::schema::{JsonSchemaValidator, SchemaCompilationError, SchemaViolation};
    pub use crate::state::StateRepository;
}
