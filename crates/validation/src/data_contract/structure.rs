// Path: crates/validation/src/data_contract/structure.rs

//! Structural validation of a raw data contract.

use super::indices::index_errors;
use crate::common::{json_depth, schema_errors};
use crate::schema::data_contract_meta_schema;
use platform_api::schema::JsonSchemaValidator;
use platform_types::app::DataContract;
use platform_types::config::ValidationConfig;
use platform_types::error::{BasicError, ProtocolError};
use platform_types::schema::{SchemaNode, DEFS_REF_PREFIX};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;
use tracing::debug;

/// Validates a raw contract and lowers it into a [`DataContract`].
///
/// Meta-schema violations, excessive depth and malformed contracts stop the
/// validation; reference, compilation and index rules are accumulated.
pub fn validate_data_contract_structure(
    schema_validator: &dyn JsonSchemaValidator,
    config: &ValidationConfig,
    raw: &Value,
) -> Result<ValidationResult<DataContract>, ProtocolError> {
    let errors = schema_errors(schema_validator, data_contract_meta_schema(), raw)?;
    if !errors.is_empty() {
        return Ok(ValidationResult::with_errors(errors));
    }

    if json_depth(raw) > config.max_schema_depth {
        return Ok(ValidationResult::with_error(
            BasicError::DataContractMaxDepthExceedError {
                max_depth: config.max_schema_depth,
            },
        ));
    }

    let contract = match DataContract::from_value(raw) {
        Ok(contract) => contract,
        Err(error) => return Ok(ValidationResult::with_error(error)),
    };

    let mut builder = ValidationResultBuilder::new();
    let defs = contract.def_nodes();

    let mut references = Vec::new();
    for document in contract.documents.values() {
        document.schema.properties.values().for_each(|p| p.collect_refs(&mut references));
    }
    for definition in contract.defs.values() {
        definition.node.collect_refs(&mut references);
    }
    references.sort_unstable();
    references.dedup();
    for reference in references {
        let resolves = reference.starts_with(DEFS_REF_PREFIX)
            && SchemaNode::Ref(reference.to_string()).resolve(&defs).is_some();
        if !resolves {
            builder.add_error(BasicError::InvalidJsonSchemaRefError {
                reference: reference.to_string(),
            });
        }
    }
    // Compiling with dangling references would only repeat the errors above.
    if !builder.is_valid() {
        return Ok(builder.build_with(contract));
    }

    for name in contract.documents.keys() {
        if let Some(schema) = contract.document_json_schema(name) {
            if let Err(e) = schema_validator.compile(&schema) {
                debug!(target: "validation", document_type = %name, error = %e, "document schema does not compile");
                builder.add_error(BasicError::from(e));
            }
        }
    }

    for document in contract.documents.values() {
        builder.add_errors(index_errors(document, &defs, config));
    }

    Ok(builder.build_with(contract))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JsonSchemaRsValidator;
    use platform_types::app::{data_contract_id, Identifier};
    use serde_json::json;

    fn raw_contract(documents: Value) -> Value {
        let owner = Identifier([7u8; 32]);
        json!({
            "protocolVersion": 1,
            "$schema": "https://schema.platform.org/dpp-0-4-0/meta/data-contract",
            "$id": data_contract_id(&owner, &[1u8; 32]),
            "ownerId": owner,
            "version": 1,
            "documents": documents
        })
    }

    fn validate(raw: &Value) -> ValidationResult<DataContract> {
        validate_data_contract_structure(
            &JsonSchemaRsValidator::new(),
            &ValidationConfig::default(),
            raw,
        )
        .unwrap()
    }

    #[test]
    fn well_formed_contract_is_lowered() {
        let raw = raw_contract(json!({
            "profile": {
                "type": "object",
                "properties": { "displayName": { "type": "string", "maxLength": 25 } },
                "additionalProperties": false
            }
        }));
        let result = validate(&raw);
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.data().unwrap().document_type("profile").is_some());
    }

    #[test]
    fn meta_schema_violations_stop_validation() {
        let mut raw = raw_contract(json!({}));
        raw["unexpected"] = json!(true);
        let result = validate(&raw);
        assert!(!result.is_valid());
        assert!(result.error_codes().iter().all(|c| *c == 1005));
        assert!(result.data().is_none());
    }

    #[test]
    fn depth_limit() {
        let mut nested = json!({ "type": "string" });
        for _ in 0..10 {
            nested = json!({
                "type": "object",
                "properties": { "inner": nested },
                "additionalProperties": false
            });
        }
        let raw = raw_contract(json!({
            "deep": { "type": "object", "properties": { "n": nested }, "additionalProperties": false }
        }));
        let config = ValidationConfig {
            max_schema_depth: 8,
            ..ValidationConfig::default()
        };
        let result =
            validate_data_contract_structure(&JsonSchemaRsValidator::new(), &config, &raw).unwrap();
        assert_eq!(result.error_codes(), vec![1007]);
    }

    #[test]
    fn references_must_be_local_and_resolve() {
        let raw = raw_contract(json!({
            "note": {
                "type": "object",
                "properties": {
                    "a": { "$ref": "#/$defs/missing" },
                    "b": { "$ref": "https://example.com/schema" }
                },
                "additionalProperties": false
            }
        }));
        assert_eq!(validate(&raw).error_codes(), vec![1011, 1011]);
    }

    #[test]
    fn index_errors_are_accumulated() {
        let raw = raw_contract(json!({
            "note": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "meta": { "type": "object", "properties": {}, "additionalProperties": false }
                },
                "indices": [
                    { "name": "byTitle", "properties": [{ "title": "asc" }] },
                    { "name": "byMeta", "properties": [{ "meta": "asc" }] }
                ],
                "additionalProperties": false
            }
        }));
        assert_eq!(validate(&raw).error_codes(), vec![1009, 1010]);
    }
}
