// Path: crates/api/src/error/mod.rs
// Re-export all core error types from the central types crate.
pub use platform_types::error::{
    BasicError, ConsensusError, ErrorCategory, ErrorCode, ProtocolError, RepositoryError,
    StateError,
};
pub use platform_types::Result;
