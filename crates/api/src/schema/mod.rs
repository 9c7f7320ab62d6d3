// Path: crates/api/src/schema/mod.rs

//! Defines the `JsonSchemaValidator` trait, the pluggable structural validator.

use platform_types::error::BasicError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One failed keyword of a schema evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// The failing keyword, e.g. `maxLength`.
    pub keyword: String,
    /// JSON pointer into the instance.
    pub instance_path: String,
    /// JSON pointer into the schema.
    pub schema_path: String,
    /// Keyword parameters, when the validator reports them.
    #[serde(default)]
    pub params: Value,
    /// Human readable description.
    pub message: String,
}

impl From<SchemaViolation> for BasicError {
    fn from(v: SchemaViolation) -> Self {
        BasicError::JsonSchemaError {
            keyword: v.keyword,
            instance_path: v.instance_path,
            schema_path: v.schema_path,
            message: v.message,
        }
    }
}

/// The schema itself is not a valid schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Schema compilation failed: {0}")]
pub struct SchemaCompilationError(pub String);

impl From<SchemaCompilationError> for BasicError {
    fn from(e: SchemaCompilationError) -> Self {
        BasicError::JsonSchemaCompilationError { message: e.0 }
    }
}

/// Evaluates a JSON schema against an instance.
pub trait JsonSchemaValidator: Send + Sync {
    /// Returns every violation, or an empty list when the instance is accepted.
    fn validate(
        &self,
        schema: &Value,
        instance: &Value,
    ) -> Result<Vec<SchemaViolation>, SchemaCompilationError>;

    /// Checks that a schema compiles without evaluating any instance.
    fn compile(&self, schema: &Value) -> Result<(), SchemaCompilationError> {
        self.validate(schema, &Value::Null).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::error::ErrorCode;

    #[test]
    fn violations_become_schema_errors() {
        let err: BasicError = SchemaViolation {
            keyword: "maxLength".into(),
            instance_path: "/displayName".into(),
            schema_path: "/properties/displayName/maxLength".into(),
            params: serde_json::json!({ "limit": 25 }),
            message: "too long".into(),
        }
        .into();
        assert_eq!(err.code(), 1005);

        let err: BasicError = SchemaCompilationError("bad".into()).into();
        assert_eq!(err.code(), 1004);
    }
}
