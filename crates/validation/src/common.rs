// Path: crates/validation/src/common.rs

//! The validator traits, their shared collaborators, and the envelope checks every
//! transition kind starts with.

use async_trait::async_trait;
use platform_api::crypto::HashSignatureVerifier;
use platform_api::schema::JsonSchemaValidator;
use platform_api::state::StateRepository;
use platform_types::app::data_contract::PROTOCOL_VERSION_PROPERTY;
use platform_types::config::ValidationConfig;
use platform_types::error::{BasicError, ConsensusError, ProtocolError};
use platform_types::validation::ValidationResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// The structural stage of one transition kind.
#[async_trait]
pub trait BasicValidation: Send + Sync {
    /// The typed transition produced when the payload is structurally valid.
    type Transition: Send + Sync;

    /// Validates a raw payload. The decoded transition is attached to a valid result.
    async fn validate_basic(
        &self,
        raw: &Value,
    ) -> Result<ValidationResult<Self::Transition>, ProtocolError>;
}

/// The chain-state stage of one transition kind. Only ever called with
/// transitions that passed [`BasicValidation`].
#[async_trait]
pub trait StateValidation: Send + Sync {
    /// The typed transition this stage inspects.
    type Transition: Send + Sync;

    /// Validates the transition against committed state.
    async fn validate_state(
        &self,
        transition: &Self::Transition,
    ) -> Result<ValidationResult, ProtocolError>;
}

/// The collaborators and configuration shared by all validators.
#[derive(Clone)]
pub struct ValidationContext {
    /// Committed chain state.
    pub repository: Arc<dyn StateRepository>,
    /// Structural schema evaluation.
    pub schema_validator: Arc<dyn JsonSchemaValidator>,
    /// Hash-signature verification.
    pub signature_verifier: Arc<dyn HashSignatureVerifier>,
    /// Limits and switches.
    pub config: Arc<ValidationConfig>,
}

impl ValidationContext {
    /// Bundles the collaborators.
    pub fn new(
        repository: Arc<dyn StateRepository>,
        schema_validator: Arc<dyn JsonSchemaValidator>,
        signature_verifier: Arc<dyn HashSignatureVerifier>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            repository,
            schema_validator,
            signature_verifier,
            config: Arc::new(config),
        }
    }

    /// The same collaborators with dry run switched on.
    pub fn dry_run(&self) -> Self {
        Self {
            config: Arc::new(self.config.dry_run()),
            ..self.clone()
        }
    }
}

/// Evaluates `schema` against `instance`, turning violations into `JsonSchemaError`s.
///
/// The schema is one of ours, so failing to compile it is a fault.
pub fn schema_errors(
    validator: &dyn JsonSchemaValidator,
    schema: &Value,
    instance: &Value,
) -> Result<Vec<ConsensusError>, ProtocolError> {
    let violations = validator
        .validate(schema, instance)
        .map_err(|e| ProtocolError::Schema(e.to_string()))?;
    Ok(violations
        .into_iter()
        .map(|v| BasicError::from(v).into())
        .collect())
}

/// Checks a payload's `protocolVersion` against the accepted window.
pub fn protocol_version_error(raw: &Value, config: &ValidationConfig) -> Option<BasicError> {
    let parsed = raw.get(PROTOCOL_VERSION_PROPERTY)?.as_u64()?;
    let parsed = u32::try_from(parsed).unwrap_or(u32::MAX);
    if parsed > config.latest_version {
        Some(BasicError::UnsupportedProtocolVersionError {
            parsed_protocol_version: parsed,
            latest_version: config.latest_version,
        })
    } else if parsed < config.minimal_version {
        Some(BasicError::IncompatibleProtocolVersionError {
            parsed_protocol_version: parsed,
            minimal_protocol_version: config.minimal_version,
        })
    } else {
        None
    }
}

/// The checks every envelope goes through: schema, protocol version, decoding.
/// Each step stops the validation when it fails.
pub fn validate_envelope<T: DeserializeOwned>(
    ctx: &ValidationContext,
    schema: &Value,
    raw: &Value,
) -> Result<ValidationResult<T>, ProtocolError> {
    let errors = schema_errors(ctx.schema_validator.as_ref(), schema, raw)?;
    if !errors.is_empty() {
        return Ok(ValidationResult::with_errors(errors));
    }
    if let Some(error) = protocol_version_error(raw, &ctx.config) {
        return Ok(ValidationResult::with_error(error));
    }
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(transition) => Ok(ValidationResult::valid(transition)),
        Err(e) => Ok(ValidationResult::with_error(
            BasicError::SerializedObjectParsingError {
                message: e.to_string(),
            },
        )),
    }
}

/// Nesting depth of a JSON value; scalars have depth 0.
pub fn json_depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn protocol_version_window() {
        let config = ValidationConfig {
            latest_version: 3,
            minimal_version: 2,
            ..ValidationConfig::default()
        };
        assert!(protocol_version_error(&json!({ "protocolVersion": 2 }), &config).is_none());
        assert!(matches!(
            protocol_version_error(&json!({ "protocolVersion": 4 }), &config),
            Some(BasicError::UnsupportedProtocolVersionError {
                parsed_protocol_version: 4,
                latest_version: 3
            })
        ));
        assert!(matches!(
            protocol_version_error(&json!({ "protocolVersion": 1 }), &config),
            Some(BasicError::IncompatibleProtocolVersionError {
                minimal_protocol_version: 2,
                ..
            })
        ));
    }

    #[test]
    fn depth_counts_containers() {
        assert_eq!(json_depth(&json!(1)), 0);
        assert_eq!(json_depth(&json!({ "a": [1, { "b": {} }] })), 3);
    }
}
