// Path: crates/validation/src/document/batch.rs

//! Validators of the documents batch transition.

use super::compound_index::{index_values, validate_compound_indices};
use crate::common::{validate_envelope, BasicValidation, StateValidation, ValidationContext};
use crate::schema::transition_schema;
use async_trait::async_trait;
use futures::future::join_all;
use platform_types::app::{
    document_id, DataContract, Document, DocumentTransition, DocumentsBatchTransition, Identifier,
    StateTransitionType,
};
use platform_types::codec::encode_value;
use platform_types::error::{BasicError, DocumentReference, ProtocolError, StateError};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

fn reference(transition: &DocumentTransition) -> DocumentReference {
    (transition.document_type().to_string(), *transition.id())
}

/// Fetches every contract referenced by the batch concurrently.
async fn fetch_contracts(
    ctx: &ValidationContext,
    transitions: &[DocumentTransition],
) -> Result<BTreeMap<Identifier, Option<DataContract>>, ProtocolError> {
    let ids: BTreeSet<Identifier> = transitions.iter().map(|t| *t.data_contract_id()).collect();
    let fetched = join_all(ids.iter().map(|id| ctx.repository.fetch_data_contract(id))).await;
    let mut contracts = BTreeMap::new();
    for (id, contract) in ids.into_iter().zip(fetched) {
        contracts.insert(id, contract?);
    }
    Ok(contracts)
}

/// Transitions that target the same document more than once.
fn duplicate_id_references(transitions: &[DocumentTransition]) -> Vec<DocumentReference> {
    let mut counts: BTreeMap<DocumentReference, usize> = BTreeMap::new();
    for transition in transitions {
        *counts.entry(reference(transition)).or_default() += 1;
    }
    transitions
        .iter()
        .map(reference)
        .filter(|r| counts.get(r).is_some_and(|count| *count > 1))
        .collect()
}

/// Created or replaced documents that collide on a fully populated unique index.
fn duplicate_index_references(
    owner_id: &Identifier,
    transitions: &[DocumentTransition],
    contract: &DataContract,
) -> Vec<DocumentReference> {
    let mut seen: BTreeMap<(String, String, Vec<u8>), usize> = BTreeMap::new();
    let mut duplicated = BTreeSet::new();

    for (position, transition) in transitions.iter().enumerate() {
        if transition.data().is_none() || transition.data_contract_id() != &contract.id {
            continue;
        }
        let Some(document_type) = contract.document_type(transition.document_type()) else {
            continue;
        };
        for index in document_type.indices.iter().filter(|i| i.unique) {
            let Some(values) = index_values(owner_id, transition, index)
                .into_iter()
                .collect::<Option<Vec<Value>>>()
            else {
                continue;
            };
            let key = (
                document_type.name.clone(),
                index.name.clone(),
                encode_value(&Value::Array(values)),
            );
            match seen.get(&key) {
                Some(first) => {
                    duplicated.insert(*first);
                    duplicated.insert(position);
                }
                None => {
                    seen.insert(key, position);
                }
            }
        }
    }

    transitions
        .iter()
        .enumerate()
        .filter(|(position, _)| duplicated.contains(position))
        .map(|(_, t)| reference(t))
        .collect()
}

/// Basic validation of [`DocumentsBatchTransition`].
///
/// Checks that need the referenced contracts are skipped in dry run.
pub struct DocumentsBatchBasicValidator {
    ctx: ValidationContext,
}

impl DocumentsBatchBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }

    fn transition_errors(
        &self,
        owner_id: &Identifier,
        transition: &DocumentTransition,
        contract: &DataContract,
        builder: &mut ValidationResultBuilder,
    ) {
        let name = transition.document_type();
        if contract.document_type(name).is_none() {
            builder.add_error(BasicError::InvalidDocumentTypeError {
                document_type: name.to_string(),
                data_contract_id: contract.id,
            });
            return;
        }

        if let DocumentTransition::Create(create) = transition {
            if let Ok(entropy) = <[u8; 32]>::try_from(create.entropy.as_slice()) {
                let expected_id = document_id(&contract.id, owner_id, name, &entropy);
                if expected_id != create.id {
                    builder.add_error(BasicError::InvalidDocumentTransitionIdError {
                        expected_id,
                        invalid_id: create.id,
                    });
                }
            }
        }

        if let (Some(data), Some(schema)) = (transition.data(), contract.document_json_schema(name))
        {
            match self.ctx.schema_validator.validate(&schema, data.as_value()) {
                Ok(violations) => {
                    builder.add_errors(violations.into_iter().map(BasicError::from));
                }
                Err(e) => {
                    builder.add_error(BasicError::from(e));
                }
            }
        }
    }
}

#[async_trait]
impl BasicValidation for DocumentsBatchBasicValidator {
    type Transition = DocumentsBatchTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::DocumentsBatch);
        let (errors, batch) =
            validate_envelope::<DocumentsBatchTransition>(&self.ctx, schema, raw)?.into_parts();
        let Some(batch) = batch else {
            return Ok(ValidationResult::with_errors(errors));
        };

        let mut builder = ValidationResultBuilder::new();

        let duplicates = duplicate_id_references(&batch.transitions);
        if !duplicates.is_empty() {
            builder.add_error(BasicError::DuplicateDocumentTransitionsWithIdsError {
                references: duplicates,
            });
        }

        if self.ctx.config.dry_run {
            return Ok(builder.build_with(batch));
        }

        let contracts = fetch_contracts(&self.ctx, &batch.transitions).await?;
        for (id, contract) in &contracts {
            let Some(contract) = contract else {
                builder.add_error(BasicError::DataContractNotPresentError {
                    data_contract_id: *id,
                });
                continue;
            };

            for transition in batch.transitions.iter().filter(|t| t.data_contract_id() == id) {
                self.transition_errors(&batch.owner_id, transition, contract, &mut builder);
            }

            let duplicates = duplicate_index_references(&batch.owner_id, &batch.transitions, contract);
            if !duplicates.is_empty() {
                builder.add_error(BasicError::DuplicateDocumentTransitionsWithIndicesError {
                    references: duplicates,
                });
            }

            builder.merge(validate_compound_indices(
                &batch.owner_id,
                &batch.transitions,
                contract,
            ));
        }

        Ok(builder.build_with(batch))
    }
}

/// State validation of [`DocumentsBatchTransition`].
pub struct DocumentsBatchStateValidator {
    ctx: ValidationContext,
}

impl DocumentsBatchStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for DocumentsBatchStateValidator {
    type Transition = DocumentsBatchTransition;

    async fn validate_state(
        &self,
        batch: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let mut builder = ValidationResultBuilder::new();

        let contracts = fetch_contracts(&self.ctx, &batch.transitions).await?;
        for (id, contract) in &contracts {
            if contract.is_none() {
                builder.add_error(BasicError::DataContractNotPresentError {
                    data_contract_id: *id,
                });
            }
        }

        // One lookup per (contract, document type), issued concurrently.
        let mut groups: BTreeMap<(Identifier, String), Vec<Identifier>> = BTreeMap::new();
        for transition in &batch.transitions {
            if matches!(contracts.get(transition.data_contract_id()), Some(Some(_))) {
                groups
                    .entry((*transition.data_contract_id(), transition.document_type().to_string()))
                    .or_default()
                    .push(*transition.id());
            }
        }
        let lookups = join_all(groups.iter().map(|((contract_id, document_type), ids)| {
            self.ctx
                .repository
                .fetch_documents(contract_id, document_type, ids)
        }))
        .await;

        let mut stored: BTreeMap<(Identifier, Identifier), Document> = BTreeMap::new();
        for documents in lookups {
            for document in documents? {
                stored.insert((document.data_contract_id, document.id), document);
            }
        }

        for transition in &batch.transitions {
            if !matches!(contracts.get(transition.data_contract_id()), Some(Some(_))) {
                continue;
            }
            let existing = stored.get(&(*transition.data_contract_id(), *transition.id()));
            match (transition, existing) {
                (DocumentTransition::Create(create), Some(_)) => {
                    builder.add_error(StateError::DocumentAlreadyPresentError {
                        document_id: create.id,
                    });
                }
                (DocumentTransition::Create(_), None) => {}
                (_, None) => {
                    builder.add_error(StateError::DocumentNotFoundError {
                        document_id: *transition.id(),
                    });
                }
                (_, Some(document)) => {
                    if document.owner_id != batch.owner_id {
                        builder.add_error(StateError::DocumentOwnerIdMismatchError {
                            document_id: document.id,
                            document_owner_id: batch.owner_id,
                            existing_owner_id: document.owner_id,
                        });
                    }
                    if let DocumentTransition::Replace(replace) = transition {
                        let expected = document.revision.saturating_add(1);
                        if replace.revision != expected {
                            builder.add_error(StateError::InvalidDocumentRevisionError {
                                document_id: document.id,
                                current_revision: document.revision,
                                provided_revision: replace.revision,
                            });
                        }
                    }
                }
            }
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::app::{DocumentDeleteTransition, DocumentReplaceTransition};
    use platform_types::codec::CanonicalJson;
    use serde_json::json;

    fn replace(id: u8, document_type: &str) -> DocumentTransition {
        DocumentTransition::Replace(DocumentReplaceTransition {
            id: Identifier([id; 32]),
            document_type: document_type.into(),
            data_contract_id: Identifier([1u8; 32]),
            revision: 2,
            data: CanonicalJson(json!({})),
        })
    }

    #[test]
    fn duplicate_ids_list_every_occurrence() {
        let transitions = vec![
            replace(1, "note"),
            replace(2, "note"),
            DocumentTransition::Delete(DocumentDeleteTransition {
                id: Identifier([1u8; 32]),
                document_type: "note".into(),
                data_contract_id: Identifier([1u8; 32]),
            }),
            replace(1, "comment"),
        ];
        assert_eq!(
            duplicate_id_references(&transitions),
            vec![
                ("note".to_string(), Identifier([1u8; 32])),
                ("note".to_string(), Identifier([1u8; 32])),
            ]
        );
    }
}
