// Path: crates/validation/src/schema/jsonschema_rs.rs

//! The default [`JsonSchemaValidator`], backed by the `jsonschema` crate.

use jsonschema::error::ValidationErrorKind;
use lru::LruCache;
use parking_lot::Mutex;
use platform_api::schema::{JsonSchemaValidator, SchemaCompilationError, SchemaViolation};
use platform_types::app::sha256;
use platform_types::codec::encode_value;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;

const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Compiles schemas with `jsonschema` and keeps recently used ones, keyed by the
/// hash of their canonical encoding.
pub struct JsonSchemaRsValidator {
    compiled: Mutex<LruCache<[u8; 32], Arc<jsonschema::Validator>>>,
}

impl JsonSchemaRsValidator {
    /// A validator with the default cache capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// A validator that keeps at most `capacity` compiled schemas.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            compiled: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn compiled(&self, schema: &Value) -> Result<Arc<jsonschema::Validator>, SchemaCompilationError> {
        let key = sha256(&encode_value(schema));
        if let Some(validator) = self.compiled.lock().get(&key) {
            return Ok(validator.clone());
        }
        // Compile outside the lock; a concurrent miss compiles twice, which is harmless.
        let validator = Arc::new(
            jsonschema::validator_for(schema)
                .map_err(|e| SchemaCompilationError(e.to_string()))?,
        );
        self.compiled.lock().put(key, validator.clone());
        Ok(validator)
    }
}

/// The keyword parameters of a failure, named the way contract tooling expects.
fn params(kind: &ValidationErrorKind) -> Value {
    match kind {
        ValidationErrorKind::Required { property } => json!({ "missingProperty": property }),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            json!({ "additionalProperties": unexpected })
        }
        ValidationErrorKind::MaxLength { limit }
        | ValidationErrorKind::MinLength { limit }
        | ValidationErrorKind::MaxItems { limit }
        | ValidationErrorKind::MinItems { limit }
        | ValidationErrorKind::MaxProperties { limit }
        | ValidationErrorKind::MinProperties { limit } => json!({ "limit": limit }),
        ValidationErrorKind::Maximum { limit }
        | ValidationErrorKind::Minimum { limit }
        | ValidationErrorKind::ExclusiveMaximum { limit }
        | ValidationErrorKind::ExclusiveMinimum { limit } => json!({ "limit": limit }),
        ValidationErrorKind::MultipleOf { multiple_of } => json!({ "multipleOf": multiple_of }),
        ValidationErrorKind::Pattern { pattern } => json!({ "pattern": pattern }),
        ValidationErrorKind::Format { format } => json!({ "format": format }),
        ValidationErrorKind::Enum { options } => json!({ "allowedValues": options }),
        ValidationErrorKind::Constant { expected_value } => {
            json!({ "allowedValue": expected_value })
        }
        _ => Value::Null,
    }
}

impl Default for JsonSchemaRsValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchemaValidator for JsonSchemaRsValidator {
    fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<Vec<SchemaViolation>, SchemaCompilationError> {
        let validator = self.compiled(schema)?;
        Ok(validator
            .iter_errors(instance)
            .map(|error| {
                let schema_path = error.schema_path.to_string();
                SchemaViolation {
                    keyword: schema_path.rsplit('/').next().unwrap_or_default().to_string(),
                    instance_path: error.instance_path.to_string(),
                    schema_path,
                    params: params(&error.kind),
                    message: error.to_string(),
                }
            })
            .collect())
    }

    fn compile(&self, schema: &Value) -> Result<(), SchemaCompilationError> {
        self.compiled(schema).map(|_| ())
    }
}
