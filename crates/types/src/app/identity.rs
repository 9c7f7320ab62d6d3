// Path: crates/types/src/app/identity.rs

//! Identities, their public keys, and the asset lock proofs that fund them.
//!
//! An identity is created by locking funds on the payment chain. The proof of that
//! lock names an out point; the identity identifier is derived from it, and the
//! locked output's public key hash is what the creating transition must be signed with.

use super::identifier::{sha256, sha256d, Identifier};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The identifier of a key, unique within one identity.
pub type KeyId = u32;

/// Size of a serialized transaction out point (32-byte txid plus 4-byte index).
pub const OUT_POINT_SIZE: usize = 36;

wire_enum! {
    /// The algorithm a public key belongs to.
    pub enum KeyType {
        /// A compressed secp256k1 public key.
        EcdsaSecp256k1 = 0,
        /// A BLS12-381 public key.
        Bls12_381 = 1,
        /// The HASH160 of a secp256k1 public key.
        EcdsaHash160 = 2,
        /// A BIP13 script hash.
        Bip13ScriptHash = 3,
    }
}

impl KeyType {
    /// The exact number of bytes a key of this type carries.
    pub fn data_size(&self) -> usize {
        match self {
            Self::EcdsaSecp256k1 => 33,
            Self::Bls12_381 => 48,
            Self::EcdsaHash160 | Self::Bip13ScriptHash => 20,
        }
    }
}

wire_enum! {
    /// What a key may be used for.
    pub enum Purpose {
        /// Signing state transitions.
        Authentication = 0,
        /// Encrypting data for the identity.
        Encryption = 1,
        /// Decrypting data sent to the identity.
        Decryption = 2,
        /// Authorizing withdrawals.
        Withdraw = 3,
    }
}

wire_enum! {
    /// How much a key is trusted. Lower values are stronger.
    pub enum SecurityLevel {
        /// Can perform any operation, including key management.
        Master = 0,
        /// Critical operations.
        Critical = 1,
        /// Everyday high value operations.
        High = 2,
        /// Everything else.
        Medium = 3,
    }
}

impl Purpose {
    /// The security levels a key of this purpose may be registered with.
    pub fn allowed_security_levels(&self) -> &'static [SecurityLevel] {
        match self {
            Self::Authentication => &[
                SecurityLevel::Master,
                SecurityLevel::Critical,
                SecurityLevel::High,
                SecurityLevel::Medium,
            ],
            Self::Encryption | Self::Decryption => &[SecurityLevel::Medium],
            Self::Withdraw => &[SecurityLevel::Critical],
        }
    }
}

/// The SHA-256 of a key's raw material, used to find which identity a key is bound to.
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
pub struct PublicKeyHash(pub [u8; 32]);

impl core::fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A public key attached to an identity.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPublicKey {
    /// Unique within the owning identity.
    pub id: KeyId,
    /// The key algorithm.
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// What the key may be used for.
    pub purpose: Purpose,
    /// How much the key is trusted.
    pub security_level: SecurityLevel,
    /// Raw key material.
    pub data: Vec<u8>,
    /// When set, the key has been disabled at this timestamp (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<u64>,
}

impl IdentityPublicKey {
    /// True unless the key has been disabled.
    pub fn is_enabled(&self) -> bool {
        self.disabled_at.is_none()
    }

    /// True for keys that satisfy the "at least one master key" rule.
    pub fn is_master(&self) -> bool {
        self.is_enabled()
            && self.purpose == Purpose::Authentication
            && self.security_level == SecurityLevel::Master
    }

    /// The globally unique binding hash of this key.
    pub fn hash(&self) -> PublicKeyHash {
        public_key_hash(&self.data)
    }
}

/// Hashes raw key material into a [`PublicKeyHash`].
pub fn public_key_hash(data: &[u8]) -> PublicKeyHash {
    PublicKeyHash(sha256(data))
}

/// An identity as committed to state.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Derived from the funding asset lock's out point.
    pub id: Identifier,
    /// Every key ever attached, including disabled ones.
    pub public_keys: Vec<IdentityPublicKey>,
    /// Credit balance.
    pub balance: u64,
    /// Incremented by each accepted update.
    pub revision: u64,
}

impl Identity {
    /// Finds a key by id.
    pub fn public_key(&self, id: KeyId) -> Option<&IdentityPublicKey> {
        self.public_keys.iter().find(|k| k.id == id)
    }
}

/// Proof that funds were locked on the payment chain.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetLockProof {
    /// The locked transaction output, `txid || index`.
    pub out_point: Vec<u8>,
    /// Present when the lock is proven through a chain lock rather than an instant lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_chain_locked_height: Option<u32>,
}

impl AssetLockProof {
    /// The identity identifier this lock creates.
    pub fn identity_id(&self) -> Identifier {
        Identifier(sha256d(&self.out_point))
    }
}

/// The output an asset lock proof resolves to on the payment chain.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetLockOutput {
    /// The hash of the key allowed to spend the lock, which must sign the transition.
    pub public_key_hash: Vec<u8>,
    /// Locked amount.
    pub value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_json_uses_numeric_enums() {
        let key: IdentityPublicKey = serde_json::from_value(json!({
            "id": 0,
            "type": 0,
            "purpose": 0,
            "securityLevel": 0,
            "data": vec![2u8; 33],
        }))
        .unwrap();
        assert_eq!(key.key_type, KeyType::EcdsaSecp256k1);
        assert!(key.is_master());

        let back = serde_json::to_value(&key).unwrap();
        assert_eq!(back["securityLevel"], json!(0));
        assert!(back.get("disabledAt").is_none());
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(KeyType::try_from(9).is_err());
        assert!(serde_json::from_value::<Purpose>(json!(7)).is_err());
    }

    #[test]
    fn disabled_master_key_does_not_count() {
        let key = IdentityPublicKey {
            id: 0,
            key_type: KeyType::EcdsaSecp256k1,
            purpose: Purpose::Authentication,
            security_level: SecurityLevel::Master,
            data: vec![2u8; 33],
            disabled_at: Some(1),
        };
        assert!(!key.is_master());
    }

    #[test]
    fn allowed_levels_per_purpose() {
        assert_eq!(
            Purpose::Withdraw.allowed_security_levels(),
            &[SecurityLevel::Critical]
        );
        assert!(Purpose::Authentication
            .allowed_security_levels()
            .contains(&SecurityLevel::Master));
    }

    #[test]
    fn identity_id_derives_from_out_point() {
        let a = AssetLockProof {
            out_point: vec![1u8; OUT_POINT_SIZE],
            core_chain_locked_height: None,
        };
        let mut b = a.clone();
        b.out_point[35] = 2;
        assert_ne!(a.identity_id(), b.identity_id());
    }
}
