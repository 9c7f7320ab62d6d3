// Path: crates/api/src/crypto/mod.rs
//! Defines the hash-signature verification primitive.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The signature bytes are not a well-formed signature.
    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),
    /// The public key hash has an unexpected shape.
    #[error("Invalid public key hash: {0}")]
    InvalidKeyHash(String),
    /// A generic failure in an underlying cryptographic library.
    #[error("Cryptographic operation failed: {0}")]
    OperationFailed(String),
}

/// Verifies a recoverable signature against the hash of the public key that must have made it.
///
/// Callers treat an `Err` exactly like `Ok(false)`: malformed input never verifies.
pub trait HashSignatureVerifier: Send + Sync {
    /// Checks `signature` over `message_hash` against `public_key_hash`.
    fn verify(
        &self,
        message_hash: &[u8; 32],
        signature: &[u8],
        public_key_hash: &[u8],
    ) -> Result<bool, CryptoError>;
}
