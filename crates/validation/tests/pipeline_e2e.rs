// Path: crates/validation/tests/pipeline_e2e.rs

mod common;

use anyhow::Result;
use platform_test_utils::fixtures::{identity_create, master_key};
use platform_test_utils::randomness::TestRng;
use platform_test_utils::{assert_err, assert_error_codes, InMemoryStateRepository, StaticSignatureVerifier};
use platform_types::app::{AssetLockOutput, StateTransitionType};
use platform_types::error::{ProtocolError, RepositoryError};
use platform_validation::{ValidationPipeline, ValidationStage};
use serde_json::json;
use std::sync::Arc;

fn funded_pipeline(out_point: &[u8]) -> (Arc<InMemoryStateRepository>, ValidationPipeline) {
    let repository = Arc::new(InMemoryStateRepository::new().with_asset_lock(
        out_point.to_vec(),
        AssetLockOutput {
            public_key_hash: vec![9u8; 20],
            value: 1,
        },
    ));
    let pipeline = common::pipeline(repository.clone(), StaticSignatureVerifier::Accept);
    (repository, pipeline)
}

#[tokio::test]
async fn unknown_or_missing_type_is_a_parsing_error() -> Result<()> {
    let (_, pipeline) = funded_pipeline(&[0u8; 36]);
    for raw in [json!({ "type": 42 }), json!({ "protocolVersion": 1 }), json!("text")] {
        let outcome = pipeline.validate(&raw).await?;
        assert_eq!(outcome.stage, ValidationStage::Basic);
        assert_error_codes!(outcome.result, [1001]);
        assert!(outcome.transition.is_none());
    }
    Ok(())
}

#[tokio::test]
async fn schema_failure_stops_the_basic_stage() -> Result<()> {
    let out_point = TestRng::new(1).out_point();
    let (repository, pipeline) = funded_pipeline(&out_point);

    let mut raw = identity_create(&out_point, &[]);
    if let Some(obj) = raw.as_object_mut() {
        obj.remove("signature");
    }
    let outcome = pipeline.validate(&raw).await?;
    assert_eq!(outcome.stage, ValidationStage::Basic);
    assert!(!outcome.result.is_valid());
    assert!(outcome.result.error_codes().iter().all(|code| *code == 1005));
    assert_eq!(repository.lookup_count(), 0);
    Ok(())
}

#[tokio::test]
async fn protocol_version_window() -> Result<()> {
    let out_point = TestRng::new(2).out_point();
    let (_, pipeline) = funded_pipeline(&out_point);

    let mut raw = identity_create(&out_point, &[master_key(0, 1)]);
    raw["protocolVersion"] = json!(99);
    assert_error_codes!(pipeline.validate_basic(&raw).await?, [1002]);

    raw["protocolVersion"] = json!(0);
    assert_error_codes!(pipeline.validate_basic(&raw).await?, [1003]);
    Ok(())
}

#[tokio::test]
async fn basic_validation_is_idempotent() -> Result<()> {
    let out_point = TestRng::new(3).out_point();
    let (_, pipeline) = funded_pipeline(&out_point);
    let raw = identity_create(&out_point, &[master_key(0, 1), master_key(0, 1)]);

    let first = pipeline.validate_basic(&raw).await?;
    let second = pipeline.validate_basic(&raw).await?;
    assert!(!first.is_valid());
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn dry_run_skips_every_lookup() -> Result<()> {
    let out_point = TestRng::new(4).out_point();
    let repository = Arc::new(InMemoryStateRepository::new());
    let pipeline = ValidationPipeline::new(
        common::context(repository.clone(), StaticSignatureVerifier::Reject).dry_run(),
    );

    let outcome = pipeline
        .validate(&identity_create(&out_point, &[master_key(0, 1)]))
        .await?;
    assert_eq!(outcome.stage, ValidationStage::Basic);
    assert!(outcome.is_valid());
    assert_eq!(
        outcome.transition.as_ref().map(|t| t.transition_type()),
        Some(StateTransitionType::IdentityCreate)
    );
    assert_eq!(repository.lookup_count(), 0);
    assert!(outcome.into_accepted().is_none());
    Ok(())
}

#[tokio::test]
async fn only_state_validated_transitions_are_accepted() -> Result<()> {
    let out_point = TestRng::new(7).out_point();
    let (_, pipeline) = funded_pipeline(&out_point);

    let outcome = pipeline
        .validate(&identity_create(&out_point, &[master_key(0, 1)]))
        .await?;
    assert_eq!(outcome.stage, ValidationStage::State);
    assert!(outcome.into_accepted().is_some());
    Ok(())
}

#[tokio::test]
async fn repository_faults_abort_instead_of_rejecting() -> Result<()> {
    let out_point = TestRng::new(5).out_point();
    let (repository, pipeline) = funded_pipeline(&out_point);
    repository.fail_with(Some(RepositoryError::Backend("connection reset".into())));

    let error = assert_err!(
        pipeline
            .validate(&identity_create(&out_point, &[master_key(0, 1)]))
            .await
    );
    assert!(matches!(
        error,
        ProtocolError::Repository(RepositoryError::Backend(_))
    ));
    Ok(())
}

#[tokio::test]
async fn validate_many_keeps_input_order() -> Result<()> {
    let out_point = TestRng::new(6).out_point();
    let (_, pipeline) = funded_pipeline(&out_point);
    let raws = vec![
        identity_create(&out_point, &[master_key(0, 1)]),
        json!({ "type": 9 }),
        identity_create(&out_point, &[master_key(0, 2), master_key(1, 2)]),
    ];

    let outcomes = pipeline.validate_many(&raws).await;
    assert_eq!(outcomes.len(), 3);
    let codes: Vec<Vec<u32>> = outcomes
        .into_iter()
        .map(|outcome| outcome.map(|o| o.result.error_codes()))
        .collect::<Result<_, _>>()?;
    assert_eq!(codes, vec![vec![], vec![1001], vec![1040]]);
    Ok(())
}
