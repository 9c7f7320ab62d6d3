// Path: crates/types/src/app/state_transition/data_contract.rs

use crate::app::identity::KeyId;
use crate::codec::CanonicalJson;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Publishes a new data contract at version 1.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataContractCreateTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The raw contract.
    pub data_contract: CanonicalJson,
    /// 32 bytes mixed into the contract identifier.
    pub entropy: Vec<u8>,
    /// Which key of the owner signed.
    pub signature_public_key_id: KeyId,
    /// Signature over the signable bytes.
    pub signature: Vec<u8>,
}

/// Publishes the next version of an existing data contract.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataContractUpdateTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The raw contract in its new version.
    pub data_contract: CanonicalJson,
    /// Which key of the owner signed.
    pub signature_public_key_id: KeyId,
    /// Signature over the signable bytes.
    pub signature: Vec<u8>,
}
