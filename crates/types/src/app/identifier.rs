// Path: crates/types/src/app/identifier.rs

//! Defines the canonical 256-bit `Identifier` and the hashing used to derive it.
//!
//! Contract, document and identity identifiers are all content-derived, so the
//! derivation functions live next to the type to keep every component on the
//! exact same preimage layout.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 256-bit, content-derived identifier for contracts, documents and identities.
///
/// In JSON it is an array of 32 integers; for humans it is rendered as base58.
#[derive(
    Encode,
    Decode,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Default,
    Hash,
)]
#[serde(transparent)]
pub struct Identifier(pub [u8; 32]);

impl Identifier {
    /// Creates an identifier from an arbitrary slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| format!("identifier must be 32 bytes, got {}", bytes.len()))?;
        Ok(Self(arr))
    }

    /// Returns the raw bytes of this identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the identifier as base58.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Identifier {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Display for Identifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, the hash used for every derived identifier and for signable bytes.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Derives the identifier of a data contract from its owner and creation entropy.
pub fn data_contract_id(owner_id: &Identifier, entropy: &[u8; 32]) -> Identifier {
    let preimage = [owner_id.as_ref(), entropy.as_slice()].concat();
    Identifier(sha256d(&preimage))
}

/// Derives the identifier of a document created by `owner_id` in a contract.
pub fn document_id(
    data_contract_id: &Identifier,
    owner_id: &Identifier,
    document_type: &str,
    entropy: &[u8; 32],
) -> Identifier {
    let preimage = [
        data_contract_id.as_ref(),
        owner_id.as_ref(),
        document_type.as_bytes(),
        entropy.as_slice(),
    ]
    .concat();
    Identifier(sha256d(&preimage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_json_form_is_byte_array() {
        let id = Identifier([7u8; 32]);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json.as_array().map(|a| a.len()), Some(32));
        let back: Identifier = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(Identifier::from_slice(&[0u8; 31]).is_err());
        assert!(Identifier::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn derived_ids_depend_on_every_input() {
        let owner = Identifier([1u8; 32]);
        let entropy = [2u8; 32];
        let contract = data_contract_id(&owner, &entropy);
        assert_ne!(contract, data_contract_id(&owner, &[3u8; 32]));

        let doc_a = document_id(&contract, &owner, "profile", &entropy);
        let doc_b = document_id(&contract, &owner, "contact", &entropy);
        assert_ne!(doc_a, doc_b);
    }
}
