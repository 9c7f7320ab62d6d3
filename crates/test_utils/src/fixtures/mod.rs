// Path: crates/test_utils/src/fixtures/mod.rs
//! Raw transition and contract fixtures.
//!
//! Builders return wire JSON so tests exercise decoding exactly as a node would.

use crate::verifier::MockHashSignatureVerifier;
use platform_types::app::{
    data_contract_id, document_id, Identifier, IdentityPublicKey, KeyId, KeyType, Purpose,
    SecurityLevel, StateTransition,
};
use platform_types::config::LATEST_PROTOCOL_VERSION;
use serde_json::{json, Value};

/// The `$schema` every fixture contract declares.
pub const CONTRACT_SCHEMA_URI: &str = "https://schema.platform.org/dpp-0-4-0/meta/data-contract";

/// A placeholder signature of the minimum accepted length.
pub fn dummy_signature() -> Vec<u8> {
    vec![0u8; 65]
}

/// The owner used by fixtures unless a test needs another one.
pub fn owner_id() -> Identifier {
    Identifier([7u8; 32])
}

/// A raw contract whose id is derived from `owner_id` and `entropy`.
pub fn contract_value(
    owner_id: &Identifier,
    entropy: &[u8; 32],
    version: u32,
    documents: Value,
) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "$schema": CONTRACT_SCHEMA_URI,
        "$id": data_contract_id(owner_id, entropy),
        "ownerId": owner_id,
        "version": version,
        "documents": documents
    })
}

/// The `profile` and `note` document types.
///
/// `note` carries a compound unique index over the owner and title, and another
/// over title and tag.
pub fn profile_documents() -> Value {
    json!({
        "profile": {
            "type": "object",
            "properties": {
                "displayName": { "type": "string", "maxLength": 25 },
                "publicMessage": { "type": "string", "maxLength": 140 }
            },
            "additionalProperties": false
        },
        "note": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "maxLength": 63 },
                "tag": { "type": "string", "maxLength": 20 },
                "body": { "type": "string" }
            },
            "required": ["title"],
            "indices": [
                {
                    "name": "ownerTitle",
                    "properties": [{ "$ownerId": "asc" }, { "title": "asc" }],
                    "unique": true
                },
                {
                    "name": "titleTag",
                    "properties": [{ "title": "asc" }, { "tag": "asc" }],
                    "unique": true
                }
            ],
            "additionalProperties": false
        }
    })
}

/// The profile contract at `version`.
pub fn profile_contract_value(entropy: &[u8; 32], version: u32) -> Value {
    contract_value(&owner_id(), entropy, version, profile_documents())
}

/// A raw data contract create transition.
pub fn data_contract_create(contract: &Value, entropy: &[u8; 32]) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 0,
        "dataContract": contract,
        "entropy": entropy.to_vec(),
        "signaturePublicKeyId": 0,
        "signature": dummy_signature()
    })
}

/// A raw data contract update transition.
pub fn data_contract_update(contract: &Value) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 4,
        "dataContract": contract,
        "signaturePublicKeyId": 0,
        "signature": dummy_signature()
    })
}

/// A raw create document transition with its id derived from `entropy`.
pub fn document_create(
    contract_id: &Identifier,
    owner_id: &Identifier,
    document_type: &str,
    entropy: &[u8; 32],
    data: Value,
) -> Value {
    json!({
        "$action": "create",
        "$id": document_id(contract_id, owner_id, document_type, entropy),
        "$type": document_type,
        "$dataContractId": contract_id,
        "$entropy": entropy.to_vec(),
        "data": data
    })
}

/// A raw replace document transition.
pub fn document_replace(
    contract_id: &Identifier,
    id: &Identifier,
    document_type: &str,
    revision: u64,
    data: Value,
) -> Value {
    json!({
        "$action": "replace",
        "$id": id,
        "$type": document_type,
        "$dataContractId": contract_id,
        "$revision": revision,
        "data": data
    })
}

/// A raw delete document transition.
pub fn document_delete(contract_id: &Identifier, id: &Identifier, document_type: &str) -> Value {
    json!({
        "$action": "delete",
        "$id": id,
        "$type": document_type,
        "$dataContractId": contract_id
    })
}

/// A raw documents batch transition.
pub fn documents_batch(owner_id: &Identifier, transitions: Vec<Value>) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 1,
        "ownerId": owner_id,
        "transitions": transitions,
        "signaturePublicKeyId": 0,
        "signature": dummy_signature()
    })
}

/// A secp256k1 key whose material is derived from `seed`.
pub fn public_key(
    id: KeyId,
    purpose: Purpose,
    security_level: SecurityLevel,
    seed: u8,
) -> IdentityPublicKey {
    let mut data = vec![seed; 33];
    if let Some(prefix) = data.first_mut() {
        *prefix = 0x02;
    }
    IdentityPublicKey {
        id,
        key_type: KeyType::EcdsaSecp256k1,
        purpose,
        security_level,
        data,
        disabled_at: None,
    }
}

/// An enabled master authentication key.
pub fn master_key(id: KeyId, seed: u8) -> IdentityPublicKey {
    public_key(id, Purpose::Authentication, SecurityLevel::Master, seed)
}

/// A raw identity create transition, unsigned.
pub fn identity_create(out_point: &[u8], public_keys: &[IdentityPublicKey]) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 2,
        "assetLockProof": { "outPoint": out_point },
        "publicKeys": public_keys,
        "signature": dummy_signature()
    })
}

/// A raw identity top-up transition, unsigned.
pub fn identity_top_up(out_point: &[u8], identity_id: &Identifier) -> Value {
    json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 3,
        "assetLockProof": { "outPoint": out_point },
        "identityId": identity_id,
        "signature": dummy_signature()
    })
}

/// A raw identity update transition.
pub fn identity_update(
    identity_id: &Identifier,
    revision: u64,
    add_public_keys: &[IdentityPublicKey],
    disable_public_keys: &[KeyId],
    public_keys_disabled_at: Option<u64>,
) -> Value {
    let mut raw = json!({
        "protocolVersion": LATEST_PROTOCOL_VERSION,
        "type": 5,
        "identityId": identity_id,
        "revision": revision,
        "signaturePublicKeyId": 0,
        "signature": dummy_signature()
    });
    if let Some(obj) = raw.as_object_mut() {
        if !add_public_keys.is_empty() {
            obj.insert("addPublicKeys".into(), json!(add_public_keys));
        }
        if !disable_public_keys.is_empty() {
            obj.insert("disablePublicKeys".into(), json!(disable_public_keys));
        }
        if let Some(at) = public_keys_disabled_at {
            obj.insert("publicKeysDisabledAt".into(), json!(at));
        }
    }
    raw
}

/// Signs a raw transition for [`MockHashSignatureVerifier`] under `public_key_hash`.
pub fn sign_with_mock(raw: &Value, public_key_hash: &[u8]) -> Result<Value, String> {
    let transition = StateTransition::from_value(raw)?;
    let hash = transition.signable_hash()?;
    let mut signed = raw.clone();
    if let Some(obj) = signed.as_object_mut() {
        obj.insert(
            "signature".into(),
            json!(MockHashSignatureVerifier::sign_for_tests(&hash, public_key_hash)),
        );
    }
    Ok(signed)
}
