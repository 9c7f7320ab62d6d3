// Path: crates/validation/src/schema/mod.rs

//! Built-in JSON schemas of the transition kinds and the data contract meta-schema,
//! the default structural validator, and the schema compatibility diff.

pub mod diff;
mod jsonschema_rs;

pub use jsonschema_rs::JsonSchemaRsValidator;

use once_cell::sync::Lazy;
use platform_types::app::StateTransitionType;
use serde_json::Value;

// A malformed built-in degrades to `null`, which every validator refuses to
// compile, so the fault surfaces as `ProtocolError::Schema` at first use.
fn builtin(source: &str) -> Value {
    serde_json::from_str(source).unwrap_or(Value::Null)
}

static DATA_CONTRACT_META: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/data_contract.json")));
static DATA_CONTRACT_CREATE: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/data_contract_create.json")));
static DATA_CONTRACT_UPDATE: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/data_contract_update.json")));
static DOCUMENTS_BATCH: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/documents_batch.json")));
static IDENTITY_CREATE: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/identity_create.json")));
static IDENTITY_TOPUP: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/identity_topup.json")));
static IDENTITY_UPDATE: Lazy<Value> =
    Lazy::new(|| builtin(include_str!("../../schema/identity_update.json")));

/// The meta-schema every data contract must satisfy.
pub fn data_contract_meta_schema() -> &'static Value {
    &DATA_CONTRACT_META
}

/// The envelope schema of one transition kind.
pub fn transition_schema(kind: StateTransitionType) -> &'static Value {
    match kind {
        StateTransitionType::DataContractCreate => &DATA_CONTRACT_CREATE,
        StateTransitionType::DataContractUpdate => &DATA_CONTRACT_UPDATE,
        StateTransitionType::DocumentsBatch => &DOCUMENTS_BATCH,
        StateTransitionType::IdentityCreate => &IDENTITY_CREATE,
        StateTransitionType::IdentityTopUp => &IDENTITY_TOPUP,
        StateTransitionType::IdentityUpdate => &IDENTITY_UPDATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_api::schema::JsonSchemaValidator;

    const KINDS: [StateTransitionType; 6] = [
        StateTransitionType::DataContractCreate,
        StateTransitionType::DocumentsBatch,
        StateTransitionType::IdentityCreate,
        StateTransitionType::IdentityTopUp,
        StateTransitionType::DataContractUpdate,
        StateTransitionType::IdentityUpdate,
    ];

    #[test]
    fn builtin_schemas_compile() {
        let validator = JsonSchemaRsValidator::new();
        assert!(validator.compile(data_contract_meta_schema()).is_ok());
        for kind in KINDS {
            let schema = transition_schema(kind);
            assert!(schema.is_object(), "{:?} schema did not parse", kind);
            assert!(validator.compile(schema).is_ok(), "{:?} schema did not compile", kind);
        }
    }

    #[test]
    fn each_schema_pins_its_type_tag() {
        for kind in KINDS {
            let tag = &transition_schema(kind)["properties"]["type"]["const"];
            assert_eq!(tag.as_u64(), Some(u64::from(u8::from(kind))));
        }
    }
}
