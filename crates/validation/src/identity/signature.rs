// Path: crates/validation/src/identity/signature.rs

//! Binds asset-lock funded transitions to the key that locked the funds.

use platform_api::crypto::HashSignatureVerifier;
use platform_api::state::StateRepository;
use platform_types::app::{AssetLockProof, StateTransition};
use platform_types::error::{ProtocolError, StateError};
use platform_types::validation::ValidationResult;

/// The transition must be signed by the key whose hash the locked output names.
///
/// A proof that does not resolve to an output fails with an invalid asset lock
/// proof. A verifier error is treated like a signature that does not verify.
pub async fn validate_asset_lock_signature(
    repository: &dyn StateRepository,
    verifier: &dyn HashSignatureVerifier,
    transition: &StateTransition,
    proof: &AssetLockProof,
) -> Result<ValidationResult, ProtocolError> {
    let Some(output) = repository.fetch_asset_lock_output(proof).await? else {
        return Ok(ValidationResult::with_error(
            StateError::InvalidAssetLockProofError {
                out_point: proof.out_point.clone(),
            },
        ));
    };

    let hash = transition
        .signable_hash()
        .map_err(ProtocolError::Encoding)?;
    let verified = verifier
        .verify(&hash, transition.signature(), &output.public_key_hash)
        .unwrap_or_else(|e| {
            tracing::debug!(target: "validation", error = %e, "signature verifier rejected input");
            false
        });

    if verified {
        Ok(ValidationResult::default())
    } else {
        Ok(ValidationResult::with_error(
            StateError::InvalidStateTransitionSignatureError {
                transition_type: transition.transition_type(),
            },
        ))
    }
}
