// Path: crates/validation/src/identity/mod.rs

//! Validators of the identity create, top-up and update transitions.

mod create;
pub mod keys;
pub mod signature;
mod top_up;
mod update;

pub use create::{IdentityCreateBasicValidator, IdentityCreateStateValidator};
pub use signature::validate_asset_lock_signature;
pub use top_up::{IdentityTopUpBasicValidator, IdentityTopUpStateValidator};
pub use update::{keys_after_update, IdentityUpdateBasicValidator, IdentityUpdateStateValidator};
