// Path: crates/validation/src/data_contract/indices.rs

//! Rules for the `indices` declared on a document type.

use platform_types::app::{DocumentType, IndexProperty};
use platform_types::config::ValidationConfig;
use platform_types::error::BasicError;
use platform_types::schema::SchemaNode;
use std::collections::{BTreeMap, BTreeSet};

/// System properties a document may be indexed by.
pub const INDEXABLE_SYSTEM_PROPERTIES: [&str; 4] = ["$id", "$ownerId", "$createdAt", "$updatedAt"];

/// Every index rule violation of one document type.
pub fn index_errors(
    document: &DocumentType,
    defs: &BTreeMap<String, SchemaNode>,
    config: &ValidationConfig,
) -> Vec<BasicError> {
    let mut errors = Vec::new();
    let mut names = BTreeSet::new();
    let mut property_lists: Vec<&[IndexProperty]> = Vec::new();
    let mut unique_count = 0usize;

    for index in &document.indices {
        if !names.insert(index.name.as_str()) {
            errors.push(BasicError::DuplicateIndexNameError {
                document_type: document.name.clone(),
                index_name: index.name.clone(),
            });
        }

        if property_lists.contains(&index.properties.as_slice()) {
            errors.push(BasicError::DuplicateIndexError {
                document_type: document.name.clone(),
                index_name: index.name.clone(),
            });
        } else {
            property_lists.push(&index.properties);
        }

        if index.unique {
            unique_count += 1;
            if unique_count == config.unique_indices_limit + 1 {
                errors.push(BasicError::UniqueIndicesLimitReachedError {
                    document_type: document.name.clone(),
                    limit: config.unique_indices_limit,
                });
            }
        }

        if let [only] = index.properties.as_slice() {
            if only.name == "$id" {
                errors.push(BasicError::SystemPropertyIndexAlreadyPresentError {
                    document_type: document.name.clone(),
                    index_name: index.name.clone(),
                    property_name: only.name.clone(),
                });
            }
        }

        for property in &index.properties {
            if let Some(error) = property_error(document, &index.name, &property.name, defs, config)
            {
                errors.push(error);
            }
        }
    }

    errors
}

fn property_error(
    document: &DocumentType,
    index_name: &str,
    property_name: &str,
    defs: &BTreeMap<String, SchemaNode>,
    config: &ValidationConfig,
) -> Option<BasicError> {
    let undefined = || BasicError::UndefinedIndexPropertyError {
        document_type: document.name.clone(),
        index_name: index_name.to_string(),
        property_name: property_name.to_string(),
    };
    let wrong_type = |property_type: &str| BasicError::InvalidIndexPropertyTypeError {
        document_type: document.name.clone(),
        index_name: index_name.to_string(),
        property_name: property_name.to_string(),
        property_type: property_type.to_string(),
    };
    let constraint = |constraint_name: &str, reason: String| {
        BasicError::InvalidIndexedPropertyConstraintError {
            document_type: document.name.clone(),
            index_name: index_name.to_string(),
            property_name: property_name.to_string(),
            constraint_name: constraint_name.to_string(),
            reason,
        }
    };

    if property_name.starts_with('$') {
        return (!INDEXABLE_SYSTEM_PROPERTIES.contains(&property_name)).then(undefined);
    }

    let Some(node) = document.schema.property_by_path(property_name, defs) else {
        return Some(undefined());
    };

    match node {
        SchemaNode::Object(_) => Some(wrong_type("object")),
        SchemaNode::Array(array) if !array.byte_array => Some(wrong_type("array")),
        SchemaNode::Array(array) => {
            let limit = config.max_indexed_byte_array_length;
            match array.max_items {
                None => Some(constraint("maxItems", "should be set".into())),
                Some(max) if max > limit => Some(constraint(
                    "maxItems",
                    format!("should be less or equal {}", limit),
                )),
                Some(_) => None,
            }
        }
        SchemaNode::String(string) => {
            let limit = config.max_indexed_string_length;
            match string.max_length {
                None => Some(constraint("maxLength", "should be set".into())),
                Some(max) if max > limit => Some(constraint(
                    "maxLength",
                    format!("should be less or equal {}", limit),
                )),
                Some(_) => None,
            }
        }
        SchemaNode::Number(_)
        | SchemaNode::Boolean
        | SchemaNode::Enum(_)
        | SchemaNode::Const(_)
        | SchemaNode::Ref(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::error::ErrorCode;
    use serde_json::{json, Value};

    fn document(indices: Value) -> DocumentType {
        DocumentType::from_value(
            "note",
            &json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "maxLength": 63 },
                    "body": { "type": "string" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "hash": { "type": "array", "byteArray": true, "maxItems": 300 },
                    "meta": {
                        "type": "object",
                        "properties": { "lang": { "type": "string", "maxLength": 8 } },
                        "additionalProperties": false
                    }
                },
                "indices": indices,
                "additionalProperties": false
            }),
        )
        .unwrap()
    }

    fn codes(indices: Value) -> Vec<u32> {
        let config = ValidationConfig::default();
        index_errors(&document(indices), &BTreeMap::new(), &config)
            .iter()
            .map(|e| e.code())
            .collect()
    }

    #[test]
    fn accepts_well_formed_indices() {
        assert!(codes(json!([
            { "name": "byTitle", "properties": [{ "title": "asc" }], "unique": true },
            { "name": "byOwner", "properties": [{ "$ownerId": "asc" }, { "title": "desc" }] },
            { "name": "byLang", "properties": [{ "meta.lang": "asc" }] }
        ]))
        .is_empty());
    }

    #[test]
    fn duplicate_names_and_property_lists() {
        assert_eq!(
            codes(json!([
                { "name": "a", "properties": [{ "title": "asc" }] },
                { "name": "a", "properties": [{ "title": "asc" }] }
            ])),
            vec![1015, 1008]
        );
    }

    #[test]
    fn unique_limit_is_reported_once() {
        let codes = codes(json!([
            { "name": "u0", "properties": [{ "title": "asc" }], "unique": true },
            { "name": "u1", "properties": [{ "title": "desc" }], "unique": true },
            { "name": "u2", "properties": [{ "$ownerId": "asc" }], "unique": true },
            { "name": "u3", "properties": [{ "$ownerId": "desc" }], "unique": true },
            { "name": "u4", "properties": [{ "$createdAt": "asc" }], "unique": true }
        ]));
        assert_eq!(codes, vec![1014]);
    }

    #[test]
    fn property_rules() {
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "$id": "asc" }] }])),
            vec![1012]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "$revision": "asc" }] }])),
            vec![1013]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "missing": "asc" }] }])),
            vec![1013]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "meta": "asc" }] }])),
            vec![1010]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "tags": "asc" }] }])),
            vec![1010]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "body": "asc" }] }])),
            vec![1009]
        );
        assert_eq!(
            codes(json!([{ "name": "i", "properties": [{ "hash": "asc" }] }])),
            vec![1009]
        );
    }
}
