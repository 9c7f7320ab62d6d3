// Path: crates/types/src/error/mod.rs
//! The consensus error taxonomy and the fault types of the validation engine.
//!
//! Rule violations are data: they are collected as [`ConsensusError`]s inside a
//! `ValidationResult` and returned to the submitting client with their numeric
//! code. Codes are part of the wire protocol and never change meaning. Faults
//! (a repository that cannot be reached, a built-in schema that does not compile)
//! are returned as [`ProtocolError`] instead.

use crate::app::{
    Identifier, Index, KeyId, PublicKeyHash, Purpose, SecurityLevel, StateTransitionType,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A trait for assigning a stable, numeric wire code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable code for this error variant.
    fn code(&self) -> u32;
}

/// Which validation stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Structural or static; fixable only by the client.
    Basic,
    /// Depends on chain state; may succeed later.
    State,
}

/// A `(document type, document id)` pair naming one document transition.
pub type DocumentReference = (String, Identifier);

/// Structural and static rule violations (codes 1000-1999).
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all_fields = "camelCase")]
pub enum BasicError {
    /// The payload could not be decoded at all.
    #[error("Failed to parse serialized object: {message}")]
    SerializedObjectParsingError {
        /// Decoder message.
        message: String,
    },
    /// The protocol version is newer than this node understands.
    #[error("Protocol version {parsed_protocol_version} is not supported, latest is {latest_version}")]
    UnsupportedProtocolVersionError {
        /// Version carried by the payload.
        parsed_protocol_version: u32,
        /// Newest supported version.
        latest_version: u32,
    },
    /// The protocol version is older than the network still accepts.
    #[error("Protocol version {parsed_protocol_version} is not compatible, minimal is {minimal_protocol_version}")]
    IncompatibleProtocolVersionError {
        /// Version carried by the payload.
        parsed_protocol_version: u32,
        /// Oldest accepted version.
        minimal_protocol_version: u32,
    },
    /// A contract-supplied schema could not be compiled.
    #[error("JSON schema compilation failed: {message}")]
    JsonSchemaCompilationError {
        /// Compiler message.
        message: String,
    },
    /// One violation reported by the structural validator.
    #[error("JSON schema '{keyword}' violation at '{instance_path}': {message}")]
    JsonSchemaError {
        /// The failing keyword.
        keyword: String,
        /// JSON pointer into the instance.
        instance_path: String,
        /// JSON pointer into the schema.
        schema_path: String,
        /// Human readable description.
        message: String,
    },
    /// An identifier field was not 32 bytes.
    #[error("Invalid identifier '{identifier_name}': {message}")]
    InvalidIdentifierError {
        /// Which field.
        identifier_name: String,
        /// What was wrong.
        message: String,
    },
    /// Document schemas nest too deeply.
    #[error("Data contract schema exceeds max depth {max_depth}")]
    DataContractMaxDepthExceedError {
        /// Configured limit.
        max_depth: usize,
    },
    /// Two indices of a document type cover the same property list.
    #[error("Duplicate index '{index_name}' in document type '{document_type}'")]
    DuplicateIndexError {
        /// The document type.
        document_type: String,
        /// The later of the two indices.
        index_name: String,
    },
    /// An indexed property lacks a size bound small enough to index.
    #[error("Indexed property '{property_name}' of '{document_type}' has invalid '{constraint_name}': {reason}")]
    InvalidIndexedPropertyConstraintError {
        /// The document type.
        document_type: String,
        /// The index.
        index_name: String,
        /// The property.
        property_name: String,
        /// The offending keyword.
        constraint_name: String,
        /// Why it is invalid.
        reason: String,
    },
    /// Objects and arrays cannot be indexed.
    #[error("Property '{property_name}' of '{document_type}' has type '{property_type}' which cannot be indexed")]
    InvalidIndexPropertyTypeError {
        /// The document type.
        document_type: String,
        /// The index.
        index_name: String,
        /// The property.
        property_name: String,
        /// Its schema type.
        property_type: String,
    },
    /// A `$ref` is not local or does not resolve.
    #[error("Invalid JSON schema $ref '{reference}'")]
    InvalidJsonSchemaRefError {
        /// The reference.
        reference: String,
    },
    /// An index consists of a system property only.
    #[error("System property '{property_name}' is already indexed, index '{index_name}' of '{document_type}' is redundant")]
    SystemPropertyIndexAlreadyPresentError {
        /// The document type.
        document_type: String,
        /// The index.
        index_name: String,
        /// The system property.
        property_name: String,
    },
    /// An index names a property the schema does not define.
    #[error("Index '{index_name}' of '{document_type}' refers to undefined property '{property_name}'")]
    UndefinedIndexPropertyError {
        /// The document type.
        document_type: String,
        /// The index.
        index_name: String,
        /// The property.
        property_name: String,
    },
    /// Too many unique indices on one document type.
    #[error("Document type '{document_type}' has more than {limit} unique indices")]
    UniqueIndicesLimitReachedError {
        /// The document type.
        document_type: String,
        /// Configured limit.
        limit: usize,
    },
    /// Two indices of a document type share a name.
    #[error("Duplicate index name '{index_name}' in document type '{document_type}'")]
    DuplicateIndexNameError {
        /// The document type.
        document_type: String,
        /// The repeated name.
        index_name: String,
    },
    /// An update did not increase the version by exactly one.
    #[error("Data contract version must be {expected}, got {actual}")]
    InvalidDataContractVersionError {
        /// Previous version plus one.
        expected: u32,
        /// Version carried by the update.
        actual: u32,
    },
    /// A document schema changed in a way that rejects previously valid documents.
    #[error("Incompatible schema change of '{document_type}' at '{field_path}' ({operation})")]
    IncompatibleDataContractSchemaError {
        /// The contract being updated.
        data_contract_id: Identifier,
        /// The document type whose schema changed.
        document_type: String,
        /// `add`, `remove` or `replace`.
        operation: String,
        /// JSON pointer of the change within the document schema.
        field_path: String,
        /// The committed schema.
        old_schema: Value,
        /// The proposed schema.
        new_schema: Value,
    },
    /// The referenced contract does not exist.
    #[error("Data contract {data_contract_id} is not present")]
    DataContractNotPresentError {
        /// The missing contract.
        data_contract_id: Identifier,
    },
    /// Several transitions of a batch target the same document.
    #[error("Document transitions with duplicate ids")]
    DuplicateDocumentTransitionsWithIdsError {
        /// The offending transitions.
        references: Vec<DocumentReference>,
    },
    /// Several transitions of a batch collide on a unique index.
    #[error("Document transitions with duplicate unique index values")]
    DuplicateDocumentTransitionsWithIndicesError {
        /// The offending transitions.
        references: Vec<DocumentReference>,
    },
    /// A compound index is only partially populated.
    #[error("Compound index of '{document_type}' must be fully defined or fully undefined")]
    InconsistentCompoundIndexDataError {
        /// The document type.
        document_type: String,
        /// The index properties.
        index_properties: Vec<String>,
    },
    /// A created document's id does not match its derivation.
    #[error("Invalid document transition id {invalid_id}, expected {expected_id}")]
    InvalidDocumentTransitionIdError {
        /// The derived id.
        expected_id: Identifier,
        /// The submitted id.
        invalid_id: Identifier,
    },
    /// The contract has no such document type.
    #[error("Data contract {data_contract_id} has no document type '{document_type}'")]
    InvalidDocumentTypeError {
        /// The unknown type.
        document_type: String,
        /// The contract.
        data_contract_id: Identifier,
    },
    /// An immutable root field of the contract was changed.
    #[error("Data contract base data was changed")]
    InvalidDataContractBaseDataError {
        /// Committed root fields.
        old_base: Value,
        /// Proposed root fields.
        new_base: Value,
    },
    /// An index of an existing document type was changed.
    #[error("Index '{index_name}' of document type '{document_type}' was changed")]
    DataContractIndicesChangedError {
        /// The document type.
        document_type: String,
        /// The changed index.
        index_name: String,
        /// The committed definition.
        old_index: Index,
        /// The proposed definition, absent if the index was removed.
        new_index: Option<Index>,
    },
    /// A created contract's id does not match its derivation.
    #[error("Invalid data contract id {invalid_id}, expected {expected_id}")]
    InvalidDataContractIdError {
        /// The derived id.
        expected_id: Identifier,
        /// The submitted id.
        invalid_id: Identifier,
    },
    /// Several enabled keys carry the same key material.
    #[error("Duplicated public keys {duplicated_public_key_ids:?}")]
    DuplicatedIdentityPublicKeyError {
        /// Ids of the repeated keys.
        duplicated_public_key_ids: Vec<KeyId>,
    },
    /// Several keys carry the same id.
    #[error("Duplicated public key ids {duplicated_ids:?}")]
    DuplicatedIdentityPublicKeyIdError {
        /// The repeated ids.
        duplicated_ids: Vec<KeyId>,
    },
    /// Key material has the wrong size for its type.
    #[error("Invalid data of public key {public_key_id}: {reason}")]
    InvalidIdentityPublicKeyDataError {
        /// The key.
        public_key_id: KeyId,
        /// What is wrong.
        reason: String,
    },
    /// The security level is not allowed for the key's purpose.
    #[error("Public key {public_key_id} with purpose {purpose} cannot have security level {security_level}")]
    InvalidIdentityPublicKeySecurityLevelError {
        /// The key.
        public_key_id: KeyId,
        /// Its purpose.
        purpose: Purpose,
        /// Its security level.
        security_level: SecurityLevel,
    },
    /// No enabled authentication key at master level.
    #[error("Identity must have at least one enabled master authentication key")]
    MissingMasterPublicKeyError,
    /// Too many enabled keys.
    #[error("Identity cannot have more than {max_items} enabled public keys")]
    MaxIdentityPublicKeyLimitReachedError {
        /// Configured limit.
        max_items: usize,
    },
    /// The same key id is listed more than once for disabling.
    #[error("Duplicated ids in disable list {duplicated_ids:?}")]
    DuplicatedDisabledPublicKeyIdError {
        /// The repeated ids.
        duplicated_ids: Vec<KeyId>,
    },
}

impl ErrorCode for BasicError {
    fn code(&self) -> u32 {
        match self {
            Self::SerializedObjectParsingError { .. } => 1001,
            Self::UnsupportedProtocolVersionError { .. } => 1002,
            Self::IncompatibleProtocolVersionError { .. } => 1003,
            Self::JsonSchemaCompilationError { .. } => 1004,
            Self::JsonSchemaError { .. } => 1005,
            Self::InvalidIdentifierError { .. } => 1006,
            Self::DataContractMaxDepthExceedError { .. } => 1007,
            Self::DuplicateIndexError { .. } => 1008,
            Self::InvalidIndexedPropertyConstraintError { .. } => 1009,
            Self::InvalidIndexPropertyTypeError { .. } => 1010,
            Self::InvalidJsonSchemaRefError { .. } => 1011,
            Self::SystemPropertyIndexAlreadyPresentError { .. } => 1012,
            Self::UndefinedIndexPropertyError { .. } => 1013,
            Self::UniqueIndicesLimitReachedError { .. } => 1014,
            Self::DuplicateIndexNameError { .. } => 1015,
            Self::InvalidDataContractVersionError { .. } => 1016,
            Self::IncompatibleDataContractSchemaError { .. } => 1017,
            Self::DataContractNotPresentError { .. } => 1018,
            Self::DuplicateDocumentTransitionsWithIdsError { .. } => 1019,
            Self::DuplicateDocumentTransitionsWithIndicesError { .. } => 1020,
            Self::InconsistentCompoundIndexDataError { .. } => 1021,
            Self::InvalidDocumentTransitionIdError { .. } => 1023,
            Self::InvalidDocumentTypeError { .. } => 1024,
            Self::InvalidDataContractBaseDataError { .. } => 1028,
            Self::DataContractIndicesChangedError { .. } => 1029,
            Self::InvalidDataContractIdError { .. } => 1030,
            Self::DuplicatedIdentityPublicKeyError { .. } => 1040,
            Self::DuplicatedIdentityPublicKeyIdError { .. } => 1041,
            Self::InvalidIdentityPublicKeyDataError { .. } => 1043,
            Self::InvalidIdentityPublicKeySecurityLevelError { .. } => 1044,
            Self::MissingMasterPublicKeyError => 1046,
            Self::MaxIdentityPublicKeyLimitReachedError { .. } => 1047,
            Self::DuplicatedDisabledPublicKeyIdError { .. } => 1048,
        }
    }
}

/// Rule violations that depend on committed chain state (codes 4000-4999).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all_fields = "camelCase")]
pub enum StateError {
    /// A contract with this id already exists.
    #[error("Data contract {data_contract_id} is already present")]
    DataContractAlreadyPresentError {
        /// The existing contract.
        data_contract_id: Identifier,
    },
    /// A document with this id already exists.
    #[error("Document {document_id} is already present")]
    DocumentAlreadyPresentError {
        /// The existing document.
        document_id: Identifier,
    },
    /// The document to replace or delete does not exist.
    #[error("Document {document_id} was not found")]
    DocumentNotFoundError {
        /// The missing document.
        document_id: Identifier,
    },
    /// The submitter does not own the document.
    #[error("Document {document_id} is owned by {existing_owner_id}, not {document_owner_id}")]
    DocumentOwnerIdMismatchError {
        /// The document.
        document_id: Identifier,
        /// The submitting owner.
        document_owner_id: Identifier,
        /// The stored owner.
        existing_owner_id: Identifier,
    },
    /// A replace did not increase the revision by exactly one.
    #[error("Document {document_id} revision {provided_revision} does not follow {current_revision}")]
    InvalidDocumentRevisionError {
        /// The document.
        document_id: Identifier,
        /// Stored revision.
        current_revision: u64,
        /// Submitted revision.
        provided_revision: u64,
    },
    /// The identity being created already exists.
    #[error("Identity {identity_id} already exists")]
    IdentityAlreadyExistsError {
        /// The identity.
        identity_id: Identifier,
    },
    /// The asset lock was already consumed.
    #[error("Asset lock out point {} was already used", hex::encode(.out_point))]
    IdentityAssetLockTransactionOutPointAlreadyExistsError {
        /// The consumed out point.
        out_point: Vec<u8>,
    },
    /// An update did not increase the identity revision by exactly one.
    #[error("Identity {identity_id} revision {provided_revision} does not follow {current_revision}")]
    InvalidIdentityRevisionError {
        /// The identity.
        identity_id: Identifier,
        /// Stored revision.
        current_revision: u64,
        /// Submitted revision.
        provided_revision: u64,
    },
    /// The identity does not exist.
    #[error("Identity {identity_id} was not found")]
    IdentityNotFoundError {
        /// The identity.
        identity_id: Identifier,
    },
    /// The referenced key does not exist on the identity.
    #[error("Public key {public_key_id} is missing")]
    MissingPublicKeyError {
        /// The key.
        public_key_id: KeyId,
    },
    /// The referenced key is already disabled.
    #[error("Public key {public_key_id} is disabled")]
    IdentityPublicKeyIsDisabledError {
        /// The key.
        public_key_id: KeyId,
    },
    /// The key material is already bound to some identity.
    #[error("Public key with hash {public_key_hash} already exists")]
    IdentityPublicKeyAlreadyExistsError {
        /// Hash of the key material.
        public_key_hash: PublicKeyHash,
    },
    /// The asset lock proof does not resolve to a chain output.
    #[error("Asset lock proof for out point {} is invalid", hex::encode(.out_point))]
    InvalidAssetLockProofError {
        /// The unresolved out point.
        out_point: Vec<u8>,
    },
    /// The signature does not verify.
    #[error("Invalid signature of {transition_type} state transition")]
    InvalidStateTransitionSignatureError {
        /// The kind of the offending transition.
        transition_type: StateTransitionType,
    },
}

impl ErrorCode for StateError {
    fn code(&self) -> u32 {
        match self {
            Self::DataContractAlreadyPresentError { .. } => 4000,
            Self::DocumentAlreadyPresentError { .. } => 4001,
            Self::DocumentNotFoundError { .. } => 4004,
            Self::DocumentOwnerIdMismatchError { .. } => 4005,
            Self::InvalidDocumentRevisionError { .. } => 4010,
            Self::IdentityAlreadyExistsError { .. } => 4011,
            Self::IdentityAssetLockTransactionOutPointAlreadyExistsError { .. } => 4012,
            Self::InvalidIdentityRevisionError { .. } => 4013,
            Self::IdentityNotFoundError { .. } => 4014,
            Self::MissingPublicKeyError { .. } => 4015,
            Self::IdentityPublicKeyIsDisabledError { .. } => 4016,
            Self::IdentityPublicKeyAlreadyExistsError { .. } => 4017,
            Self::InvalidAssetLockProofError { .. } => 4018,
            Self::InvalidStateTransitionSignatureError { .. } => 4020,
        }
    }
}

/// Any rule violation, as returned to the submitting client.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConsensusError {
    /// A structural or static violation.
    #[error(transparent)]
    Basic(#[from] BasicError),
    /// A chain-state violation.
    #[error(transparent)]
    State(#[from] StateError),
}

impl ConsensusError {
    /// Which partition of the taxonomy the error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Basic(_) => ErrorCategory::Basic,
            Self::State(_) => ErrorCategory::State,
        }
    }

    /// The wire representation: code, message and structured fields.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
            "data": serde_json::to_value(self).unwrap_or(Value::Null),
        })
    }
}

impl ErrorCode for ConsensusError {
    fn code(&self) -> u32 {
        match self {
            Self::Basic(e) => e.code(),
            Self::State(e) => e.code(),
        }
    }
}

/// Failures of the state repository collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backend could not be reached or failed.
    #[error("Repository backend error: {0}")]
    Backend(String),
    /// A stored value could not be decoded.
    #[error("Repository decode error: {0}")]
    Decode(String),
}

/// Faults that abort a validation instead of producing a consensus error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A repository lookup failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// A built-in schema could not be compiled.
    #[error("Built-in schema error: {0}")]
    Schema(String),
    /// A value could not be canonically encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_categories() {
        let basic: ConsensusError = BasicError::MissingMasterPublicKeyError.into();
        assert_eq!(basic.code(), 1046);
        assert_eq!(basic.category(), ErrorCategory::Basic);

        let state: ConsensusError = StateError::IdentityPublicKeyAlreadyExistsError {
            public_key_hash: PublicKeyHash([0u8; 32]),
        }
        .into();
        assert_eq!(state.code(), 4017);
        assert_eq!(state.category(), ErrorCategory::State);
    }

    #[test]
    fn wire_form_carries_code_and_fields() {
        let err: ConsensusError = BasicError::InvalidDataContractVersionError {
            expected: 2,
            actual: 3,
        }
        .into();
        let wire = err.to_wire();
        assert_eq!(wire["code"], 1016);
        assert_eq!(wire["data"]["name"], "InvalidDataContractVersionError");
        assert_eq!(wire["data"]["expected"], 2);
        assert_eq!(wire["data"]["actual"], 3);
    }

    #[test]
    fn messages_are_human_readable() {
        let err = StateError::IdentityAssetLockTransactionOutPointAlreadyExistsError {
            out_point: vec![0xab, 0xcd],
        };
        assert!(err.to_string().contains("abcd"));
        let err = StateError::InvalidStateTransitionSignatureError {
            transition_type: StateTransitionType::IdentityCreate,
        };
        assert!(err.to_string().contains("IdentityCreate"));
    }
}
