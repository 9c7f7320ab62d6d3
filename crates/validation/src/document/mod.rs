// Path: crates/validation/src/document/mod.rs

//! Validation of document batches: the compound index rule and the batch validators.

pub mod batch;
pub mod compound_index;

pub use batch::{DocumentsBatchBasicValidator, DocumentsBatchStateValidator};
pub use compound_index::{index_value, validate_compound_indices};
