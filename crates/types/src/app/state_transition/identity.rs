// Path: crates/types/src/app/state_transition/identity.rs

use crate::app::identifier::Identifier;
use crate::app::identity::{AssetLockProof, IdentityPublicKey, KeyId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Registers a new identity, funded by and signed with the key of an asset lock.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCreateTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The funding lock.
    pub asset_lock_proof: AssetLockProof,
    /// Initial keys of the identity.
    pub public_keys: Vec<IdentityPublicKey>,
    /// Signature by the asset lock key.
    pub signature: Vec<u8>,
}

impl IdentityCreateTransition {
    /// The identifier of the identity being created.
    pub fn identity_id(&self) -> Identifier {
        self.asset_lock_proof.identity_id()
    }
}

/// Adds credits to an existing identity.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityTopUpTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The funding lock.
    pub asset_lock_proof: AssetLockProof,
    /// The identity receiving the credits.
    pub identity_id: Identifier,
    /// Signature by the asset lock key.
    pub signature: Vec<u8>,
}

/// Adds new keys to an identity and/or disables existing ones.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUpdateTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The identity being updated.
    pub identity_id: Identifier,
    /// Must be the stored revision plus one.
    pub revision: u64,
    /// Keys to attach.
    #[serde(default)]
    pub add_public_keys: Vec<IdentityPublicKey>,
    /// Ids of existing keys to disable.
    #[serde(default)]
    pub disable_public_keys: Vec<KeyId>,
    /// Timestamp recorded on the disabled keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_keys_disabled_at: Option<u64>,
    /// Which key of the identity signed.
    pub signature_public_key_id: KeyId,
    /// Signature over the signable bytes.
    pub signature: Vec<u8>,
}
