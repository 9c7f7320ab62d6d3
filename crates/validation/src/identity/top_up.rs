// Path: crates/validation/src/identity/top_up.rs

use super::signature::validate_asset_lock_signature;
use crate::common::{validate_envelope, BasicValidation, StateValidation, ValidationContext};
use crate::schema::transition_schema;
use async_trait::async_trait;
use platform_types::app::{IdentityTopUpTransition, StateTransition, StateTransitionType};
use platform_types::error::{ProtocolError, StateError};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;

/// Basic validation of [`IdentityTopUpTransition`]. Everything it checks is
/// expressed by the envelope schema.
pub struct IdentityTopUpBasicValidator {
    ctx: ValidationContext,
}

impl IdentityTopUpBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BasicValidation for IdentityTopUpBasicValidator {
    type Transition = IdentityTopUpTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::IdentityTopUp);
        validate_envelope::<IdentityTopUpTransition>(&self.ctx, schema, raw)
    }
}

/// State validation of [`IdentityTopUpTransition`].
pub struct IdentityTopUpStateValidator {
    ctx: ValidationContext,
}

impl IdentityTopUpStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for IdentityTopUpStateValidator {
    type Transition = IdentityTopUpTransition;

    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let repository = self.ctx.repository.as_ref();
        let out_point = &transition.asset_lock_proof.out_point;

        let (identity, out_point_used) = futures::try_join!(
            repository.fetch_identity(&transition.identity_id),
            repository.is_asset_lock_out_point_used(out_point),
        )?;

        let mut builder = ValidationResultBuilder::new();
        if identity.is_none() {
            builder.add_error(StateError::IdentityNotFoundError {
                identity_id: transition.identity_id,
            });
        }
        if out_point_used {
            builder.add_error(
                StateError::IdentityAssetLockTransactionOutPointAlreadyExistsError {
                    out_point: out_point.clone(),
                },
            );
        }
        if !builder.is_valid() {
            return Ok(builder.build());
        }

        validate_asset_lock_signature(
            repository,
            self.ctx.signature_verifier.as_ref(),
            &StateTransition::IdentityTopUp(transition.clone()),
            &transition.asset_lock_proof,
        )
        .await
    }
}
