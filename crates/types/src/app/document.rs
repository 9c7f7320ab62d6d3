// Path: crates/types/src/app/document.rs

//! Documents as stored in state, returned by repository lookups.

use super::identifier::Identifier;
use crate::codec::CanonicalJson;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A committed document.
#[derive(Encode, Decode, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document identifier.
    #[serde(rename = "$id")]
    pub id: Identifier,
    /// Document type name within the contract.
    #[serde(rename = "$type")]
    pub document_type: String,
    /// The contract defining the document type.
    #[serde(rename = "$dataContractId")]
    pub data_contract_id: Identifier,
    /// The identity that owns the document.
    #[serde(rename = "$ownerId")]
    pub owner_id: Identifier,
    /// Starts at 1, incremented by each replace.
    #[serde(rename = "$revision")]
    pub revision: u64,
    /// User-defined properties.
    #[serde(default)]
    pub data: CanonicalJson,
}
