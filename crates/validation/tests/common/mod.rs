// Path: crates/validation/tests/common/mod.rs
#![allow(dead_code)]

use platform_api::crypto::HashSignatureVerifier;
use platform_test_utils::InMemoryStateRepository;
use platform_types::app::DataContract;
use platform_types::config::ValidationConfig;
use platform_validation::{JsonSchemaRsValidator, ValidationContext, ValidationPipeline};
use serde_json::Value;
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

pub fn context(
    repository: Arc<InMemoryStateRepository>,
    verifier: impl HashSignatureVerifier + 'static,
) -> ValidationContext {
    TRACING.call_once(|| {
        let _ = platform_telemetry::init::init_tracing();
    });
    ValidationContext::new(
        repository,
        Arc::new(JsonSchemaRsValidator::new()),
        Arc::new(verifier),
        ValidationConfig::default(),
    )
}

pub fn pipeline(
    repository: Arc<InMemoryStateRepository>,
    verifier: impl HashSignatureVerifier + 'static,
) -> ValidationPipeline {
    ValidationPipeline::new(context(repository, verifier))
}

pub fn contract(raw: &Value) -> DataContract {
    DataContract::from_value(raw).unwrap()
}
