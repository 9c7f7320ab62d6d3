// Path: crates/types/src/app/state_transition/documents_batch.rs

use crate::app::identifier::Identifier;
use crate::app::identity::KeyId;
use crate::codec::CanonicalJson;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Creates a document.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DocumentCreateTransition {
    /// Must equal the id derived from contract, owner, type and entropy.
    #[serde(rename = "$id")]
    pub id: Identifier,
    /// Document type name.
    #[serde(rename = "$type")]
    pub document_type: String,
    /// The contract defining the type.
    #[serde(rename = "$dataContractId")]
    pub data_contract_id: Identifier,
    /// 32 bytes mixed into the document id.
    #[serde(rename = "$entropy")]
    pub entropy: Vec<u8>,
    /// User-defined properties.
    #[serde(default)]
    pub data: CanonicalJson,
}

/// Replaces the properties of an existing document.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DocumentReplaceTransition {
    /// The document being replaced.
    #[serde(rename = "$id")]
    pub id: Identifier,
    /// Document type name.
    #[serde(rename = "$type")]
    pub document_type: String,
    /// The contract defining the type.
    #[serde(rename = "$dataContractId")]
    pub data_contract_id: Identifier,
    /// Must be the stored revision plus one.
    #[serde(rename = "$revision")]
    pub revision: u64,
    /// The new user-defined properties.
    #[serde(default)]
    pub data: CanonicalJson,
}

/// Deletes an existing document.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DocumentDeleteTransition {
    /// The document being deleted.
    #[serde(rename = "$id")]
    pub id: Identifier,
    /// Document type name.
    #[serde(rename = "$type")]
    pub document_type: String,
    /// The contract defining the type.
    #[serde(rename = "$dataContractId")]
    pub data_contract_id: Identifier,
}

/// One operation of a documents batch, tagged by `$action`.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "$action", rename_all = "camelCase")]
pub enum DocumentTransition {
    /// `"$action": "create"`
    Create(DocumentCreateTransition),
    /// `"$action": "replace"`
    Replace(DocumentReplaceTransition),
    /// `"$action": "delete"`
    Delete(DocumentDeleteTransition),
}

impl DocumentTransition {
    /// The target document id.
    pub fn id(&self) -> &Identifier {
        match self {
            Self::Create(t) => &t.id,
            Self::Replace(t) => &t.id,
            Self::Delete(t) => &t.id,
        }
    }

    /// The target document type.
    pub fn document_type(&self) -> &str {
        match self {
            Self::Create(t) => &t.document_type,
            Self::Replace(t) => &t.document_type,
            Self::Delete(t) => &t.document_type,
        }
    }

    /// The contract the document type belongs to.
    pub fn data_contract_id(&self) -> &Identifier {
        match self {
            Self::Create(t) => &t.data_contract_id,
            Self::Replace(t) => &t.data_contract_id,
            Self::Delete(t) => &t.data_contract_id,
        }
    }

    /// The document properties, for operations that carry them.
    pub fn data(&self) -> Option<&CanonicalJson> {
        match self {
            Self::Create(t) => Some(&t.data),
            Self::Replace(t) => Some(&t.data),
            Self::Delete(_) => None,
        }
    }

    /// A stable lowercase name of the operation.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Replace(_) => "replace",
            Self::Delete(_) => "delete",
        }
    }

    /// Resolves a `$`-prefixed system property against the transition itself.
    ///
    /// `$ownerId` is not part of a document transition and resolves against the
    /// batch owner, so it is handled by the caller.
    pub fn system_property(&self, name: &str) -> Option<Value> {
        let value = match name {
            "$id" => serde_json::to_value(self.id()).ok()?,
            "$type" => Value::String(self.document_type().to_string()),
            "$dataContractId" => serde_json::to_value(self.data_contract_id()).ok()?,
            "$revision" => match self {
                Self::Replace(t) => Value::from(t.revision),
                Self::Create(_) => Value::from(1u64),
                Self::Delete(_) => return None,
            },
            _ => return None,
        };
        Some(value)
    }
}

/// Creates, replaces or deletes documents on behalf of one owner.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsBatchTransition {
    /// Protocol version the transition was built against.
    pub protocol_version: u32,
    /// The submitting identity.
    pub owner_id: Identifier,
    /// The document operations.
    pub transitions: Vec<DocumentTransition>,
    /// Which key of the owner signed.
    pub signature_public_key_id: KeyId,
    /// Signature over the signable bytes.
    pub signature: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_tag_selects_variant() {
        let t: DocumentTransition = serde_json::from_value(json!({
            "$action": "replace",
            "$id": vec![1u8; 32],
            "$type": "profile",
            "$dataContractId": vec![2u8; 32],
            "$revision": 2,
            "data": { "displayName": "alice" }
        }))
        .unwrap();
        assert_eq!(t.action(), "replace");
        assert_eq!(t.system_property("$revision"), Some(json!(2)));
        assert_eq!(t.data().and_then(|d| d.get("displayName")), Some(&json!("alice")));
        assert_eq!(t.system_property("$ownerId"), None);
    }
}
