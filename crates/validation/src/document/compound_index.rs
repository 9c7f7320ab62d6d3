// Path: crates/validation/src/document/compound_index.rs

//! Index value resolution and the compound index consistency rule.

use platform_types::app::{DataContract, DocumentTransition, Identifier, Index};
use platform_types::error::BasicError;
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;

/// The value an indexed property takes for one document transition.
///
/// `$ownerId` resolves to the batch owner, other `$` properties to the transition
/// envelope, everything else to the (possibly dotted) path in the document data.
/// `null` counts as undefined.
pub fn index_value(
    owner_id: &Identifier,
    transition: &DocumentTransition,
    property: &str,
) -> Option<Value> {
    let value = if property == "$ownerId" {
        serde_json::to_value(owner_id).ok()
    } else if property.starts_with('$') {
        transition.system_property(property)
    } else {
        transition
            .data()
            .and_then(|data| {
                property
                    .split('.')
                    .try_fold(data.as_value(), |value, segment| value.get(segment))
            })
            .cloned()
    };
    value.filter(|v| !v.is_null())
}

/// Values of every property of `index`, or `None` for the undefined ones.
pub fn index_values(
    owner_id: &Identifier,
    transition: &DocumentTransition,
    index: &Index,
) -> Vec<Option<Value>> {
    index
        .properties
        .iter()
        .map(|p| index_value(owner_id, transition, &p.name))
        .collect()
}

/// Every compound unique index must be fully defined or fully undefined in each
/// created or replaced document of `contract`. All violations are reported.
pub fn validate_compound_indices(
    owner_id: &Identifier,
    transitions: &[DocumentTransition],
    contract: &DataContract,
) -> ValidationResult {
    let mut builder = ValidationResultBuilder::new();

    for transition in transitions
        .iter()
        .filter(|t| t.data().is_some() && t.data_contract_id() == &contract.id)
    {
        let Some(document_type) = contract.document_type(transition.document_type()) else {
            continue;
        };
        for index in document_type.compound_unique_indices() {
            let values = index_values(owner_id, transition, index);
            let defined = values.iter().filter(|v| v.is_some()).count();
            if defined != 0 && defined != values.len() {
                builder.add_error(BasicError::InconsistentCompoundIndexDataError {
                    document_type: document_type.name.clone(),
                    index_properties: index.property_names(),
                });
            }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::app::{DocumentCreateTransition, DocumentDeleteTransition};
    use platform_types::codec::CanonicalJson;
    use platform_types::error::ConsensusError;
    use serde_json::json;

    const OWNER: Identifier = Identifier([5u8; 32]);

    fn contract() -> DataContract {
        DataContract::from_value(&json!({
            "protocolVersion": 1,
            "$schema": "https://schema.platform.org/dpp-0-4-0/meta/data-contract",
            "$id": Identifier([1u8; 32]),
            "ownerId": OWNER,
            "version": 1,
            "documents": {
                "order": {
                    "type": "object",
                    "properties": {
                        "a": { "type": "string", "maxLength": 10 },
                        "b": { "type": "integer" },
                        "c": { "type": "string", "maxLength": 10 }
                    },
                    "indices": [
                        { "name": "ab", "properties": [{ "a": "asc" }, { "b": "asc" }], "unique": true },
                        { "name": "ownerC", "properties": [{ "$ownerId": "asc" }, { "c": "asc" }], "unique": true },
                        { "name": "abPlain", "properties": [{ "a": "asc" }, { "b": "desc" }] }
                    ],
                    "additionalProperties": false
                }
            }
        }))
        .unwrap()
    }

    fn create(id: u8, data: Value) -> DocumentTransition {
        DocumentTransition::Create(DocumentCreateTransition {
            id: Identifier([id; 32]),
            document_type: "order".into(),
            data_contract_id: Identifier([1u8; 32]),
            entropy: vec![0u8; 32],
            data: CanonicalJson(data),
        })
    }

    #[test]
    fn resolves_system_and_dotted_properties() {
        let t = create(9, json!({ "address": { "city": "Lisbon" } }));
        assert_eq!(index_value(&OWNER, &t, "address.city"), Some(json!("Lisbon")));
        assert_eq!(index_value(&OWNER, &t, "$ownerId"), serde_json::to_value(OWNER).ok());
        assert_eq!(index_value(&OWNER, &t, "$revision"), Some(json!(1)));
        assert_eq!(index_value(&OWNER, &t, "$createdAt"), None);
        assert_eq!(index_value(&OWNER, &t, "address.zip"), None);
    }

    #[test]
    fn partial_compound_data_is_reported_per_document() {
        let contract = contract();
        let transitions = vec![
            create(1, json!({ "a": "x", "b": 1, "c": "z" })),
            create(2, json!({ "c": "z" })),
            create(3, json!({ "a": "x", "c": "z" })),
            create(4, json!({ "b": 2, "c": "z" })),
            DocumentTransition::Delete(DocumentDeleteTransition {
                id: Identifier([6u8; 32]),
                document_type: "order".into(),
                data_contract_id: Identifier([1u8; 32]),
            }),
        ];
        let result = validate_compound_indices(&OWNER, &transitions, &contract);
        assert_eq!(result.error_codes(), vec![1021, 1021]);
    }

    #[test]
    fn owner_index_requires_its_data_property() {
        let contract = contract();
        let result =
            validate_compound_indices(&OWNER, &[create(1, json!({ "a": "x", "b": 1 }))], &contract);
        assert_eq!(
            result.errors().to_vec(),
            vec![ConsensusError::from(
                BasicError::InconsistentCompoundIndexDataError {
                    document_type: "order".into(),
                    index_properties: vec!["$ownerId".into(), "c".into()],
                }
            )]
        );
    }
}
