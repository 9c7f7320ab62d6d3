// Path: crates/test_utils/src/lib.rs
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

//! # Platform Test Utilities
//!
//! In-memory collaborators, transition fixtures and assertion macros for
//! testing the validators.

pub mod assertions;
pub mod fixtures;
pub mod randomness;
pub mod repository;
pub mod verifier;

pub use repository::InMemoryStateRepository;
pub use verifier::{MockHashSignatureVerifier, StaticSignatureVerifier};
