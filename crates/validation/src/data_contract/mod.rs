// Path: crates/validation/src/data_contract/mod.rs

//! Validators of the data contract create and update transitions.

pub mod indices;
pub mod structure;
pub mod update;

pub use structure::validate_data_contract_structure;
pub use update::validate_update_rules;

use crate::common::{validate_envelope, BasicValidation, StateValidation, ValidationContext};
use crate::schema::transition_schema;
use async_trait::async_trait;
use platform_types::app::{
    data_contract_id, DataContract, DataContractCreateTransition, DataContractUpdateTransition,
    StateTransitionType,
};
use platform_types::codec::CanonicalJson;
use platform_types::error::{BasicError, ProtocolError, StateError};
use platform_types::prelude::OptionExt;
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;

/// Lowers the contract embedded in an already structurally valid transition.
fn embedded_contract(data: &CanonicalJson) -> Result<DataContract, ProtocolError> {
    DataContract::from_value(data.as_value()).map_err(|e| ProtocolError::Encoding(e.to_string()))
}

/// Basic validation of [`DataContractCreateTransition`].
pub struct DataContractCreateBasicValidator {
    ctx: ValidationContext,
}

impl DataContractCreateBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BasicValidation for DataContractCreateBasicValidator {
    type Transition = DataContractCreateTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::DataContractCreate);
        let (errors, transition) =
            validate_envelope::<DataContractCreateTransition>(&self.ctx, schema, raw)?.into_parts();
        let Some(transition) = transition else {
            return Ok(ValidationResult::with_errors(errors));
        };

        let mut builder = ValidationResultBuilder::new();
        let structure = validate_data_contract_structure(
            self.ctx.schema_validator.as_ref(),
            &self.ctx.config,
            transition.data_contract.as_value(),
        )?;
        let Some(contract) = builder.merge(structure) else {
            return Ok(builder.build_with(transition));
        };

        if contract.version != 1 {
            builder.add_error(BasicError::InvalidDataContractVersionError {
                expected: 1,
                actual: contract.version,
            });
        }

        match <[u8; 32]>::try_from(transition.entropy.as_slice()) {
            Ok(entropy) => {
                let expected_id = data_contract_id(&contract.owner_id, &entropy);
                if expected_id != contract.id {
                    builder.add_error(BasicError::InvalidDataContractIdError {
                        expected_id,
                        invalid_id: contract.id,
                    });
                }
            }
            Err(_) => {
                builder.add_error(BasicError::SerializedObjectParsingError {
                    message: "entropy must be 32 bytes".to_string(),
                });
            }
        }

        Ok(builder.build_with(transition))
    }
}

/// State validation of [`DataContractCreateTransition`].
pub struct DataContractCreateStateValidator {
    ctx: ValidationContext,
}

impl DataContractCreateStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for DataContractCreateStateValidator {
    type Transition = DataContractCreateTransition;

    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let contract = embedded_contract(&transition.data_contract)?;
        let existing = self.ctx.repository.fetch_data_contract(&contract.id).await?;
        if existing.is_some() {
            return Ok(ValidationResult::with_error(
                StateError::DataContractAlreadyPresentError {
                    data_contract_id: contract.id,
                },
            ));
        }
        Ok(ValidationResult::default())
    }
}

/// Basic validation of [`DataContractUpdateTransition`].
///
/// The rules of an update only make sense against the committed contract, so this
/// stage fetches it. With `dry_run` set the lookup and the rules depending on it
/// are skipped.
pub struct DataContractUpdateBasicValidator {
    ctx: ValidationContext,
}

impl DataContractUpdateBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BasicValidation for DataContractUpdateBasicValidator {
    type Transition = DataContractUpdateTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::DataContractUpdate);
        let (errors, transition) =
            validate_envelope::<DataContractUpdateTransition>(&self.ctx, schema, raw)?.into_parts();
        let Some(transition) = transition else {
            return Ok(ValidationResult::with_errors(errors));
        };

        let mut builder = ValidationResultBuilder::new();
        let structure = validate_data_contract_structure(
            self.ctx.schema_validator.as_ref(),
            &self.ctx.config,
            transition.data_contract.as_value(),
        )?;
        let Some(new_contract) = builder.merge(structure) else {
            return Ok(builder.build_with(transition));
        };

        if self.ctx.config.dry_run {
            tracing::debug!(target: "validation", data_contract_id = %new_contract.id, "dry run, skipping committed contract rules");
            return Ok(builder.build_with(transition));
        }

        let old_contract = match self
            .ctx
            .repository
            .fetch_data_contract(&new_contract.id)
            .await?
            .required(BasicError::DataContractNotPresentError {
                data_contract_id: new_contract.id,
            }) {
            Ok(contract) => contract,
            Err(error) => {
                builder.add_error(error);
                return Ok(builder.build_with(transition));
            }
        };

        builder.merge(validate_update_rules(&old_contract, &new_contract));
        Ok(builder.build_with(transition))
    }
}

/// State validation of [`DataContractUpdateTransition`]: the contract must still
/// exist and the update must follow its latest version.
pub struct DataContractUpdateStateValidator {
    ctx: ValidationContext,
}

impl DataContractUpdateStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for DataContractUpdateStateValidator {
    type Transition = DataContractUpdateTransition;

    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let new_contract = embedded_contract(&transition.data_contract)?;
        let Some(latest) = self
            .ctx
            .repository
            .fetch_data_contract(&new_contract.id)
            .await?
        else {
            return Ok(ValidationResult::with_error(
                BasicError::DataContractNotPresentError {
                    data_contract_id: new_contract.id,
                },
            ));
        };
        Ok(match update::version_error(&latest, &new_contract) {
            Some(error) => ValidationResult::with_error(error),
            None => ValidationResult::default(),
        })
    }
}
