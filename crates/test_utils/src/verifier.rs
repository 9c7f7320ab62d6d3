// Path: crates/test_utils/src/verifier.rs
//! Signature verifiers for tests.

use platform_api::crypto::{CryptoError, HashSignatureVerifier};
use platform_types::app::sha256;

/// A verifier with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub enum StaticSignatureVerifier {
    /// Every signature verifies.
    Accept,
    /// No signature verifies.
    Reject,
    /// Every call errors.
    Fail,
}

impl HashSignatureVerifier for StaticSignatureVerifier {
    fn verify(
        &self,
        _message_hash: &[u8; 32],
        _signature: &[u8],
        _public_key_hash: &[u8],
    ) -> Result<bool, CryptoError> {
        match self {
            Self::Accept => Ok(true),
            Self::Reject => Ok(false),
            Self::Fail => Err(CryptoError::OperationFailed("static failure".into())),
        }
    }
}

const MOCK_SIGNATURE_LEN: usize = 65;

/// A keyed-hash stand-in for recoverable signatures: a signature commits to both
/// the message hash and the public key hash, so changing either breaks it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockHashSignatureVerifier;

impl MockHashSignatureVerifier {
    /// The signature the verifier accepts for `message_hash` under `public_key_hash`.
    pub fn sign_for_tests(message_hash: &[u8; 32], public_key_hash: &[u8]) -> Vec<u8> {
        let mut forward = message_hash.to_vec();
        forward.extend_from_slice(public_key_hash);
        let mut backward = public_key_hash.to_vec();
        backward.extend_from_slice(message_hash);

        let mut signature = Vec::with_capacity(MOCK_SIGNATURE_LEN);
        signature.push(0x1f);
        signature.extend_from_slice(&sha256(&forward));
        signature.extend_from_slice(&sha256(&backward));
        signature
    }
}

impl HashSignatureVerifier for MockHashSignatureVerifier {
    fn verify(
        &self,
        message_hash: &[u8; 32],
        signature: &[u8],
        public_key_hash: &[u8],
    ) -> Result<bool, CryptoError> {
        if signature.len() != MOCK_SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                MOCK_SIGNATURE_LEN,
                signature.len()
            )));
        }
        if public_key_hash.len() != 20 {
            return Err(CryptoError::InvalidKeyHash(format!(
                "expected 20 bytes, got {}",
                public_key_hash.len()
            )));
        }
        Ok(Self::sign_for_tests(message_hash, public_key_hash) == signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_signature_binds_message_and_key() {
        let verifier = MockHashSignatureVerifier;
        let signature = MockHashSignatureVerifier::sign_for_tests(&[1u8; 32], &[2u8; 20]);
        assert_eq!(verifier.verify(&[1u8; 32], &signature, &[2u8; 20]), Ok(true));
        assert_eq!(verifier.verify(&[3u8; 32], &signature, &[2u8; 20]), Ok(false));
        assert_eq!(verifier.verify(&[1u8; 32], &signature, &[4u8; 20]), Ok(false));
        assert!(verifier.verify(&[1u8; 32], &[0u8; 10], &[2u8; 20]).is_err());
    }
}
