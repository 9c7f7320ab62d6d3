// Path: crates/validation/src/identity/update.rs

use super::keys::{bound_key_errors_per_key, validate_identity_key_set, validate_public_keys};
use crate::common::{validate_envelope, BasicValidation, StateValidation, ValidationContext};
use crate::schema::transition_schema;
use async_trait::async_trait;
use platform_types::app::{
    Identity, IdentityPublicKey, IdentityUpdateTransition, KeyId, StateTransitionType,
};
use platform_types::error::{BasicError, ProtocolError, StateError};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key ids listed more than once for disabling.
fn duplicate_disabled_ids(ids: &[KeyId]) -> Vec<KeyId> {
    let mut counts: BTreeMap<KeyId, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(*id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

/// The key set the identity would hold once the update is applied.
pub fn keys_after_update(
    identity: &Identity,
    transition: &IdentityUpdateTransition,
) -> Vec<IdentityPublicKey> {
    let disabled_at = transition.public_keys_disabled_at.unwrap_or_default();
    identity
        .public_keys
        .iter()
        .cloned()
        .map(|mut key| {
            if key.is_enabled() && transition.disable_public_keys.contains(&key.id) {
                key.disabled_at = Some(disabled_at);
            }
            key
        })
        .chain(transition.add_public_keys.iter().cloned())
        .collect()
}

/// Basic validation of [`IdentityUpdateTransition`].
pub struct IdentityUpdateBasicValidator {
    ctx: ValidationContext,
}

impl IdentityUpdateBasicValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BasicValidation for IdentityUpdateBasicValidator {
    type Transition = IdentityUpdateTransition;

    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError> {
        let schema = transition_schema(StateTransitionType::IdentityUpdate);
        let (errors, transition) =
            validate_envelope::<IdentityUpdateTransition>(&self.ctx, schema, raw)?.into_parts();
        let Some(transition) = transition else {
            return Ok(ValidationResult::with_errors(errors));
        };

        let mut builder = ValidationResultBuilder::new();
        builder.merge(validate_public_keys(
            &transition.add_public_keys,
            self.ctx.config.max_public_keys,
        ));
        let duplicated_ids = duplicate_disabled_ids(&transition.disable_public_keys);
        if !duplicated_ids.is_empty() {
            builder.add_error(BasicError::DuplicatedDisabledPublicKeyIdError { duplicated_ids });
        }
        Ok(builder.build_with(transition))
    }
}

/// State validation of [`IdentityUpdateTransition`].
///
/// Besides the revision and the disabled key references, the resulting key set is
/// held to the same rules as the keys of a new identity.
pub struct IdentityUpdateStateValidator {
    ctx: ValidationContext,
}

impl IdentityUpdateStateValidator {
    /// A validator over the given collaborators.
    pub fn new(ctx: ValidationContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl StateValidation for IdentityUpdateStateValidator {
    type Transition = IdentityUpdateTransition;

    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError> {
        let repository = self.ctx.repository.as_ref();
        let Some(identity) = repository.fetch_identity(&transition.identity_id).await? else {
            return Ok(ValidationResult::with_error(
                StateError::IdentityNotFoundError {
                    identity_id: transition.identity_id,
                },
            ));
        };

        let mut builder = ValidationResultBuilder::new();

        let expected = identity.revision.saturating_add(1);
        if transition.revision != expected {
            builder.add_error(StateError::InvalidIdentityRevisionError {
                identity_id: identity.id,
                current_revision: identity.revision,
                provided_revision: transition.revision,
            });
        }

        for id in &transition.disable_public_keys {
            match identity.public_key(*id) {
                None => {
                    builder.add_error(StateError::MissingPublicKeyError { public_key_id: *id });
                }
                Some(key) if !key.is_enabled() => {
                    builder.add_error(StateError::IdentityPublicKeyIsDisabledError {
                        public_key_id: *id,
                    });
                }
                Some(_) => {}
            }
        }

        builder.merge(validate_identity_key_set(
            &keys_after_update(&identity, transition),
            self.ctx.config.max_public_keys,
        ));
        builder.merge(bound_key_errors_per_key(repository, &transition.add_public_keys).await?);

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::app::{Identifier, KeyType, Purpose, SecurityLevel};

    fn key(id: KeyId, fill: u8) -> IdentityPublicKey {
        IdentityPublicKey {
            id,
            key_type: KeyType::EcdsaSecp256k1,
            purpose: Purpose::Authentication,
            security_level: SecurityLevel::Master,
            data: vec![fill; 33],
            disabled_at: None,
        }
    }

    #[test]
    fn applies_disables_and_additions() {
        let mut old_disabled = key(1, 2);
        old_disabled.disabled_at = Some(5);
        let identity = Identity {
            id: Identifier([1u8; 32]),
            public_keys: vec![key(0, 1), old_disabled],
            balance: 0,
            revision: 0,
        };
        let transition = IdentityUpdateTransition {
            protocol_version: 1,
            identity_id: identity.id,
            revision: 1,
            add_public_keys: vec![key(2, 3)],
            disable_public_keys: vec![0, 1],
            public_keys_disabled_at: Some(9),
            signature_public_key_id: 0,
            signature: vec![0u8; 65],
        };

        let keys = keys_after_update(&identity, &transition);
        let disabled: Vec<_> = keys.iter().map(|k| (k.id, k.disabled_at)).collect();
        assert_eq!(disabled, vec![(0, Some(9)), (1, Some(5)), (2, None)]);
    }

    #[test]
    fn repeated_disable_ids() {
        assert_eq!(duplicate_disabled_ids(&[3, 1, 3, 2, 1]), vec![1, 3]);
        assert!(duplicate_disabled_ids(&[0, 1]).is_empty());
    }
}
