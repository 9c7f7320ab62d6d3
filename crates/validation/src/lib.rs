// Path: crates/validation/src/lib.rs
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
//! # Platform Validation
//!
//! The consensus rules for state transitions. Every transition kind has a
//! *basic* validator (structure, static rules, and for updates the prior
//! contract) and a *state* validator (rules against committed chain state).
//! Rule violations are collected into a [`ValidationResult`]; only faults of a
//! collaborator abort with a [`ProtocolError`].
//!
//! [`ValidationResult`]: platform_types::validation::ValidationResult
//! [`ProtocolError`]: platform_types::error::ProtocolError

pub mod common;
pub mod data_contract;
pub mod document;
pub mod identity;
pub mod pipeline;
pub mod schema;

pub use common::{BasicValidation, StateValidation, ValidationContext};
pub use pipeline::{PipelineOutcome, ValidationPipeline, ValidationStage};
pub use schema::JsonSchemaRsValidator;
