// Path: crates/types/src/app/state_transition/mod.rs

//! The closed set of state transition kinds.
//!
//! On the wire a transition is a JSON object whose numeric `type` field selects the
//! kind. In memory it is the [`StateTransition`] enum, so the pipeline dispatches with
//! an exhaustive `match`.

mod data_contract;
mod documents_batch;
mod identity;

pub use data_contract::{DataContractCreateTransition, DataContractUpdateTransition};
pub use documents_batch::{
    DocumentCreateTransition, DocumentDeleteTransition, DocumentReplaceTransition,
    DocumentTransition, DocumentsBatchTransition,
};
pub use identity::{IdentityCreateTransition, IdentityTopUpTransition, IdentityUpdateTransition};

use super::identifier::sha256d;
use crate::codec;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope property selecting the transition kind.
pub const TYPE_PROPERTY: &str = "type";

wire_enum! {
    /// The numeric kind tag carried by every transition.
    pub enum StateTransitionType {
        /// Publishes a new data contract.
        DataContractCreate = 0,
        /// Creates, replaces or deletes documents.
        DocumentsBatch = 1,
        /// Registers a new identity funded by an asset lock.
        IdentityCreate = 2,
        /// Adds credits to an identity from an asset lock.
        IdentityTopUp = 3,
        /// Publishes a new version of an existing data contract.
        DataContractUpdate = 4,
        /// Adds or disables identity keys.
        IdentityUpdate = 5,
    }
}

impl StateTransitionType {
    /// A stable lowercase label, used for metrics and log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::DataContractCreate => "data_contract_create",
            Self::DocumentsBatch => "documents_batch",
            Self::IdentityCreate => "identity_create",
            Self::IdentityTopUp => "identity_top_up",
            Self::DataContractUpdate => "data_contract_update",
            Self::IdentityUpdate => "identity_update",
        }
    }
}

/// A fully decoded state transition.
#[derive(Encode, Decode, Clone, Debug, PartialEq)]
pub enum StateTransition {
    /// See [`DataContractCreateTransition`].
    #[codec(index = 0)]
    DataContractCreate(DataContractCreateTransition),
    /// See [`DocumentsBatchTransition`].
    #[codec(index = 1)]
    DocumentsBatch(DocumentsBatchTransition),
    /// See [`IdentityCreateTransition`].
    #[codec(index = 2)]
    IdentityCreate(IdentityCreateTransition),
    /// See [`IdentityTopUpTransition`].
    #[codec(index = 3)]
    IdentityTopUp(IdentityTopUpTransition),
    /// See [`DataContractUpdateTransition`].
    #[codec(index = 4)]
    DataContractUpdate(DataContractUpdateTransition),
    /// See [`IdentityUpdateTransition`].
    #[codec(index = 5)]
    IdentityUpdate(IdentityUpdateTransition),
}

impl StateTransition {
    /// Reads the kind tag of a raw transition without decoding the rest.
    pub fn type_of(raw: &Value) -> Result<StateTransitionType, String> {
        let tag = raw
            .get(TYPE_PROPERTY)
            .and_then(Value::as_u64)
            .ok_or_else(|| "state transition has no numeric 'type'".to_string())?;
        let tag = u8::try_from(tag).map_err(|_| format!("unknown state transition type {}", tag))?;
        StateTransitionType::try_from(tag)
    }

    /// Decodes a raw JSON transition into its typed form.
    pub fn from_value(raw: &Value) -> Result<Self, String> {
        fn decode<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, String> {
            serde_json::from_value(raw.clone()).map_err(|e| e.to_string())
        }

        Ok(match Self::type_of(raw)? {
            StateTransitionType::DataContractCreate => Self::DataContractCreate(decode(raw)?),
            StateTransitionType::DocumentsBatch => Self::DocumentsBatch(decode(raw)?),
            StateTransitionType::IdentityCreate => Self::IdentityCreate(decode(raw)?),
            StateTransitionType::IdentityTopUp => Self::IdentityTopUp(decode(raw)?),
            StateTransitionType::DataContractUpdate => Self::DataContractUpdate(decode(raw)?),
            StateTransitionType::IdentityUpdate => Self::IdentityUpdate(decode(raw)?),
        })
    }

    /// Encodes the transition back into its wire JSON, `type` tag included.
    pub fn to_value(&self) -> Result<Value, String> {
        let mut value = match self {
            Self::DataContractCreate(t) => serde_json::to_value(t),
            Self::DocumentsBatch(t) => serde_json::to_value(t),
            Self::IdentityCreate(t) => serde_json::to_value(t),
            Self::IdentityTopUp(t) => serde_json::to_value(t),
            Self::DataContractUpdate(t) => serde_json::to_value(t),
            Self::IdentityUpdate(t) => serde_json::to_value(t),
        }
        .map_err(|e| e.to_string())?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                TYPE_PROPERTY.to_string(),
                Value::from(u8::from(self.transition_type())),
            );
        }
        Ok(value)
    }

    /// The kind tag.
    pub fn transition_type(&self) -> StateTransitionType {
        match self {
            Self::DataContractCreate(_) => StateTransitionType::DataContractCreate,
            Self::DocumentsBatch(_) => StateTransitionType::DocumentsBatch,
            Self::IdentityCreate(_) => StateTransitionType::IdentityCreate,
            Self::IdentityTopUp(_) => StateTransitionType::IdentityTopUp,
            Self::DataContractUpdate(_) => StateTransitionType::DataContractUpdate,
            Self::IdentityUpdate(_) => StateTransitionType::IdentityUpdate,
        }
    }

    /// The protocol version the transition was built against.
    pub fn protocol_version(&self) -> u32 {
        match self {
            Self::DataContractCreate(t) => t.protocol_version,
            Self::DocumentsBatch(t) => t.protocol_version,
            Self::IdentityCreate(t) => t.protocol_version,
            Self::IdentityTopUp(t) => t.protocol_version,
            Self::DataContractUpdate(t) => t.protocol_version,
            Self::IdentityUpdate(t) => t.protocol_version,
        }
    }

    /// The signature bytes.
    pub fn signature(&self) -> &[u8] {
        match self {
            Self::DataContractCreate(t) => &t.signature,
            Self::DocumentsBatch(t) => &t.signature,
            Self::IdentityCreate(t) => &t.signature,
            Self::IdentityTopUp(t) => &t.signature,
            Self::DataContractUpdate(t) => &t.signature,
            Self::IdentityUpdate(t) => &t.signature,
        }
    }

    /// Serializes the transition for signing (excluding the signature itself).
    pub fn to_sign_bytes(&self) -> Result<Vec<u8>, String> {
        let mut temp = self.clone();
        match &mut temp {
            Self::DataContractCreate(t) => t.signature = Vec::new(),
            Self::DocumentsBatch(t) => t.signature = Vec::new(),
            Self::IdentityCreate(t) => t.signature = Vec::new(),
            Self::IdentityTopUp(t) => t.signature = Vec::new(),
            Self::DataContractUpdate(t) => t.signature = Vec::new(),
            Self::IdentityUpdate(t) => t.signature = Vec::new(),
        }
        codec::to_bytes_canonical(&temp)
    }

    /// The message hash a signer commits to: SHA-256d of the signable bytes.
    pub fn signable_hash(&self) -> Result<[u8; 32], String> {
        Ok(sha256d(&self.to_sign_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AssetLockProof, Identifier};
    use serde_json::json;

    fn top_up(signature: Vec<u8>) -> StateTransition {
        StateTransition::IdentityTopUp(IdentityTopUpTransition {
            protocol_version: 1,
            asset_lock_proof: AssetLockProof {
                out_point: vec![4u8; 36],
                core_chain_locked_height: None,
            },
            identity_id: Identifier([9u8; 32]),
            signature,
        })
    }

    #[test]
    fn sign_bytes_ignore_signature() {
        let a = top_up(vec![1u8; 65]);
        let b = top_up(vec![2u8; 65]);
        assert_eq!(a.to_sign_bytes().unwrap(), b.to_sign_bytes().unwrap());
        assert_eq!(a.signable_hash().unwrap(), b.signable_hash().unwrap());
    }

    #[test]
    fn value_roundtrip_keeps_type_tag() {
        let original = top_up(vec![1u8; 65]);
        let value = original.to_value().unwrap();
        assert_eq!(value["type"], json!(3));
        assert_eq!(
            StateTransition::type_of(&value).unwrap(),
            StateTransitionType::IdentityTopUp
        );
        assert_eq!(StateTransition::from_value(&value).unwrap(), original);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(StateTransition::type_of(&json!({ "type": 42 })).is_err());
        assert!(StateTransition::type_of(&json!({ "type": 1000 })).is_err());
        assert!(StateTransition::type_of(&json!({})).is_err());
    }
}
