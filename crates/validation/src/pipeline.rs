// Path: crates/validation/src/pipeline.rs

//! Sequences the basic and state stages of every transition kind.
//!
//! The raw payload's `type` tag selects the validators. A transition only reaches
//! the state stage once its basic result is empty, and the caller only ever sees
//! a decoded [`StateTransition`] that passed every stage that ran.

use crate::common::{BasicValidation, StateValidation, ValidationContext};
use crate::data_contract::{
    DataContractCreateBasicValidator, DataContractCreateStateValidator,
    DataContractUpdateBasicValidator, DataContractUpdateStateValidator,
};
use crate::document::{DocumentsBatchBasicValidator, DocumentsBatchStateValidator};
use crate::identity::{
    IdentityCreateBasicValidator, IdentityCreateStateValidator, IdentityTopUpBasicValidator,
    IdentityTopUpStateValidator, IdentityUpdateBasicValidator, IdentityUpdateStateValidator,
};
use futures::future::join_all;
use platform_telemetry::time::Timer;
use platform_telemetry::{error_metrics, validation_metrics};
use platform_types::app::{StateTransition, StateTransitionType};
use platform_types::error::{BasicError, ErrorCode, ProtocolError, RepositoryError};
use platform_types::validation::ValidationResult;
use serde_json::Value;

/// The stage a pipeline run ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Structure and static rules.
    Basic,
    /// Rules against committed state.
    State,
}

impl ValidationStage {
    /// Label used in metrics and log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::State => "state",
        }
    }
}

/// The result of running a transition through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// The last stage that ran.
    pub stage: ValidationStage,
    /// Errors of that stage.
    pub result: ValidationResult,
    /// The decoded transition, present once basic validation passed.
    pub transition: Option<StateTransition>,
}

impl PipelineOutcome {
    /// True when every stage that ran found no error.
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    /// The transition, only if both stages ran and passed. A dry run never
    /// yields one.
    pub fn into_accepted(self) -> Option<StateTransition> {
        if self.stage == ValidationStage::State && self.result.is_valid() {
            self.transition
        } else {
            None
        }
    }
}

fn fault_variant(error: &ProtocolError) -> &'static str {
    match error {
        ProtocolError::Repository(RepositoryError::Backend(_)) => "repository_backend",
        ProtocolError::Repository(RepositoryError::Decode(_)) => "repository_decode",
        ProtocolError::Schema(_) => "schema",
        ProtocolError::Encoding(_) => "encoding",
    }
}

fn record<T>(
    kind: &str,
    stage: ValidationStage,
    result: &Result<ValidationResult<T>, ProtocolError>,
) {
    match result {
        Ok(result) => {
            let outcome = if result.is_valid() { "valid" } else { "invalid" };
            validation_metrics().inc_transitions_validated(kind, stage.as_label(), outcome);
            for error in result.errors() {
                validation_metrics().inc_consensus_error(error.code());
            }
            if result.is_valid() {
                tracing::debug!(target: "pipeline", kind, stage = stage.as_label(), "stage passed");
            } else {
                tracing::info!(
                    target: "pipeline",
                    kind,
                    stage = stage.as_label(),
                    errors = ?result.error_codes(),
                    "stage rejected transition"
                );
            }
        }
        Err(e) => {
            error_metrics().inc_error("protocol", fault_variant(e));
            tracing::warn!(target: "pipeline", kind, stage = stage.as_label(), error = %e, "validation aborted");
        }
    }
}

/// Holds one basic and one state validator per transition kind over shared
/// collaborators.
pub struct ValidationPipeline {
    ctx: ValidationContext,
    data_contract_create: (DataContractCreateBasicValidator, DataContractCreateStateValidator),
    data_contract_update: (DataContractUpdateBasicValidator, DataContractUpdateStateValidator),
    documents_batch: (DocumentsBatchBasicValidator, DocumentsBatchStateValidator),
    identity_create: (IdentityCreateBasicValidator, IdentityCreateStateValidator),
    identity_top_up: (IdentityTopUpBasicValidator, IdentityTopUpStateValidator),
    identity_update: (IdentityUpdateBasicValidator, IdentityUpdateStateValidator),
}

impl ValidationPipeline {
    /// Builds every validator over `ctx`.
    pub fn new(ctx: ValidationContext) -> Self {
        Self {
            data_contract_create: (
                DataContractCreateBasicValidator::new(ctx.clone()),
                DataContractCreateStateValidator::new(ctx.clone()),
            ),
            data_contract_update: (
                DataContractUpdateBasicValidator::new(ctx.clone()),
                DataContractUpdateStateValidator::new(ctx.clone()),
            ),
            documents_batch: (
                DocumentsBatchBasicValidator::new(ctx.clone()),
                DocumentsBatchStateValidator::new(ctx.clone()),
            ),
            identity_create: (
                IdentityCreateBasicValidator::new(ctx.clone()),
                IdentityCreateStateValidator::new(ctx.clone()),
            ),
            identity_top_up: (
                IdentityTopUpBasicValidator::new(ctx.clone()),
                IdentityTopUpStateValidator::new(ctx.clone()),
            ),
            identity_update: (
                IdentityUpdateBasicValidator::new(ctx.clone()),
                IdentityUpdateStateValidator::new(ctx.clone()),
            ),
            ctx,
        }
    }

    /// The collaborators the validators share.
    pub fn context(&self) -> &ValidationContext {
        &self.ctx
    }

    /// Decodes and structurally validates a raw transition.
    ///
    /// A payload without a known `type` tag fails with a parsing error.
    pub async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<StateTransition>, ProtocolError> {
        let kind = match StateTransition::type_of(raw) {
            Ok(kind) => kind,
            Err(message) => {
                let result = Ok(ValidationResult::with_error(
                    BasicError::SerializedObjectParsingError { message },
                ));
                record("unknown", ValidationStage::Basic, &result);
                return result;
            }
        };

        let label = kind.as_label();
        let _timer = Timer::new(validation_metrics(), label, ValidationStage::Basic.as_label());
        let result = match kind {
            StateTransitionType::DataContractCreate => self
                .data_contract_create
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::DataContractCreate)),
            StateTransitionType::DataContractUpdate => self
                .data_contract_update
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::DataContractUpdate)),
            StateTransitionType::DocumentsBatch => self
                .documents_batch
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::DocumentsBatch)),
            StateTransitionType::IdentityCreate => self
                .identity_create
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::IdentityCreate)),
            StateTransitionType::IdentityTopUp => self
                .identity_top_up
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::IdentityTopUp)),
            StateTransitionType::IdentityUpdate => self
                .identity_update
                .0
                .validate_basic(raw)
                .await
                .map(|r| r.map(StateTransition::IdentityUpdate)),
        };
        record(label, ValidationStage::Basic, &result);
        result
    }

    /// Validates a structurally valid transition against committed state.
    pub async fn validate_state(
        &self,
        transition: &StateTransition,
    ) -> Result<ValidationResult, ProtocolError> {
        let label = transition.transition_type().as_label();
        let _timer = Timer::new(validation_metrics(), label, ValidationStage::State.as_label());
        let result = match transition {
            StateTransition::DataContractCreate(t) => {
                self.data_contract_create.1.validate_state(t).await
            }
            StateTransition::DataContractUpdate(t) => {
                self.data_contract_update.1.validate_state(t).await
            }
            StateTransition::DocumentsBatch(t) => self.documents_batch.1.validate_state(t).await,
            StateTransition::IdentityCreate(t) => self.identity_create.1.validate_state(t).await,
            StateTransition::IdentityTopUp(t) => self.identity_top_up.1.validate_state(t).await,
            StateTransition::IdentityUpdate(t) => self.identity_update.1.validate_state(t).await,
        };
        record(label, ValidationStage::State, &result);
        result
    }

    /// Runs the basic stage, then the state stage unless basic failed or `dry_run`
    /// is set.
    pub async fn validate(&self, raw: &Value) -> Result<PipelineOutcome, ProtocolError> {
        let (errors, transition) = self.validate_basic(raw).await?.into_parts();
        let Some(transition) = transition.filter(|_| errors.is_empty()) else {
            return Ok(PipelineOutcome {
                stage: ValidationStage::Basic,
                result: ValidationResult::with_errors(errors),
                transition: None,
            });
        };

        if self.ctx.config.dry_run {
            return Ok(PipelineOutcome {
                stage: ValidationStage::Basic,
                result: ValidationResult::default(),
                transition: Some(transition),
            });
        }

        let result = self.validate_state(&transition).await?;
        Ok(PipelineOutcome {
            stage: ValidationStage::State,
            result,
            transition: Some(transition),
        })
    }

    /// Validates independent transitions concurrently, one outcome per input in
    /// input order.
    pub async fn validate_many(
        &self,
        raws: &[Value],
    ) -> Vec<Result<PipelineOutcome, ProtocolError>> {
        join_all(raws.iter().map(|raw| self.validate(raw))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_variants_are_distinct() {
        let variants = [
            fault_variant(&ProtocolError::Repository(RepositoryError::Backend("x".into()))),
            fault_variant(&ProtocolError::Repository(RepositoryError::Decode("x".into()))),
            fault_variant(&ProtocolError::Schema("x".into())),
            fault_variant(&ProtocolError::Encoding("x".into())),
        ];
        for (i, a) in variants.iter().enumerate() {
            for b in variants.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn rejected_outcome_never_yields_a_transition() {
        let outcome = PipelineOutcome {
            stage: ValidationStage::Basic,
            result: ValidationResult::with_error(BasicError::MissingMasterPublicKeyError),
            transition: None,
        };
        assert!(!outcome.is_valid());
        assert!(outcome.into_accepted().is_none());
    }

    #[test]
    fn basic_only_outcome_is_not_accepted() {
        use platform_types::app::{AssetLockProof, Identifier, IdentityTopUpTransition};

        let transition = StateTransition::IdentityTopUp(IdentityTopUpTransition {
            protocol_version: 1,
            asset_lock_proof: AssetLockProof {
                out_point: vec![4u8; 36],
                core_chain_locked_height: None,
            },
            identity_id: Identifier([9u8; 32]),
            signature: vec![0u8; 65],
        });
        let basic = PipelineOutcome {
            stage: ValidationStage::Basic,
            result: ValidationResult::default(),
            transition: Some(transition.clone()),
        };
        assert!(basic.is_valid());
        assert!(basic.into_accepted().is_none());

        let state = PipelineOutcome {
            stage: ValidationStage::State,
            result: ValidationResult::default(),
            transition: Some(transition.clone()),
        };
        assert_eq!(state.into_accepted(), Some(transition));
    }
}
