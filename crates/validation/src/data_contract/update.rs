// Path: crates/validation/src/data_contract/update.rs

//! Rules a contract update must satisfy relative to the committed contract.

use crate::schema::diff::incompatible_changes;
use platform_types::app::DataContract;
use platform_types::codec::canonical_eq;
use platform_types::error::BasicError;
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;

/// The version must grow by exactly one.
pub fn version_error(old: &DataContract, new: &DataContract) -> Option<BasicError> {
    let expected = old.version.saturating_add(1);
    (new.version != expected).then(|| BasicError::InvalidDataContractVersionError {
        expected,
        actual: new.version,
    })
}

/// Runs the version, schema compatibility, base data and index rules and
/// accumulates every violation.
pub fn validate_update_rules(old: &DataContract, new: &DataContract) -> ValidationResult {
    let mut builder = ValidationResultBuilder::new();

    if let Some(error) = version_error(old, new) {
        builder.add_error(error);
    }

    let old_defs = old.def_nodes();
    let new_defs = new.def_nodes();
    for (name, old_document) in &old.documents {
        let Some(new_document) = new.document_type(name) else {
            builder.add_error(BasicError::IncompatibleDataContractSchemaError {
                data_contract_id: old.id,
                document_type: name.clone(),
                operation: "remove".to_string(),
                field_path: String::new(),
                old_schema: old_document.raw_schema.clone(),
                new_schema: Value::Null,
            });
            continue;
        };
        for change in
            incompatible_changes(&old_document.schema, &old_defs, &new_document.schema, &new_defs)
        {
            builder.add_error(BasicError::IncompatibleDataContractSchemaError {
                data_contract_id: old.id,
                document_type: name.clone(),
                operation: change.operation.as_str().to_string(),
                field_path: change.path,
                old_schema: old_document.raw_schema.clone(),
                new_schema: new_document.raw_schema.clone(),
            });
        }
    }

    let old_base = DataContract::base_data(old.as_value());
    let new_base = DataContract::base_data(new.as_value());
    if !canonical_eq(&old_base, &new_base) {
        builder.add_error(BasicError::InvalidDataContractBaseDataError { old_base, new_base });
    }

    for (name, old_document) in &old.documents {
        let Some(new_document) = new.document_type(name) else {
            continue;
        };
        for old_index in &old_document.indices {
            let new_index = new_document.indices.iter().find(|i| i.name == old_index.name);
            if new_index != Some(old_index) {
                builder.add_error(BasicError::DataContractIndicesChangedError {
                    document_type: name.clone(),
                    index_name: old_index.name.clone(),
                    old_index: old_index.clone(),
                    new_index: new_index.cloned(),
                });
            }
        }
    }

    builder.build()
}
