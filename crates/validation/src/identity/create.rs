// Path: crates/validation/src/identity/create.rs

use super::keys::{bound_key_errors, missing_master_key_error, validate_public_keys};
use super::signature::validate_asset_lock_signature;
use crate::common::{validate_envelope, BasicValidation, StateValidation, ValidationContext};
use crate::schema::transition_schema;
use async_trait::async_trait;
use platform_types::app::{IdentityCreateTransition, StateTransition, StateTransitionType};
use platform_types::error::{ProtocolError, StateError};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;

/// Basic validation of [`IdentityCreateTransition`].
pub struct IdentityCreateBasicValidator {
    ctx: ValidationContext,
}

impl IdentityCreateBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BasicValidation for IdentityCreateBasicValidator {
    type Transition = IdentityCreateTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::IdentityCreate);
        let (errors, transition) =
            validate_envelope::<IdentityCreateTransition>(&self.ctx, schema, raw)?.into_parts();
        let Some(transition) = transition else {
            return Ok(ValidationResult::with_errors(errors));
        };

        let mut builder = ValidationResultBuilder::new();
        builder.merge(validate_public_keys(
            &transition.public_keys,
            self.ctx.config.max_public_keys,
        ));
        builder.add_errors(missing_master_key_error(&transition.public_keys));
        Ok(builder.build_with(transition))
    }
}

/// State validation of [`IdentityCreateTransition`].
///
/// The identity, out point and key lookups are independent and run concurrently.
/// The signature is only checked once they all pass.
pub struct IdentityCreateStateValidator {
    ctx: ValidationContext,
}

impl IdentityCreateStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for IdentityCreateStateValidator {
    type Transition = IdentityCreateTransition;

    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let repository = self.ctx.repository.as_ref();
        let identity_id = transition.identity_id();
        let out_point = &transition.asset_lock_proof.out_point;

        let (existing, out_point_used, bound_keys) = futures::try_join!(
            async { Ok::<_, ProtocolError>(repository.fetch_identity(&identity_id).await?) },
            async {
                Ok::<_, ProtocolError>(repository.is_asset_lock_out_point_used(out_point).await?)
            },
            bound_key_errors(repository, &transition.public_keys),
        )?;

        let mut builder = ValidationResultBuilder::new();
        if existing.is_some() {
            builder.add_error(StateError::IdentityAlreadyExistsError { identity_id });
        }
        if out_point_used {
            builder.add_error(
                StateError::IdentityAssetLockTransactionOutPointAlreadyExistsError {
                    out_point: out_point.clone(),
                },
            );
        }
        builder.merge(bound_keys);
        if !builder.is_valid() {
            return Ok(builder.build());
        }

        validate_asset_lock_signature(
            repository,
            self.ctx.signature_verifier.as_ref(),
            &StateTransition::IdentityCreate(transition.clone()),
            &transition.asset_lock_proof,
        )
        .await
    }
}
