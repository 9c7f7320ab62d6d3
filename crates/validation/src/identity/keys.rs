// Path: crates/validation/src/identity/keys.rs

//! Admission rules for identity public keys.
//!
//! The static rules look at one key list at a time. Key ids must be unique over
//! the whole list, while key material must only be unique among enabled keys, so
//! a disabled key may share data with a live one.

use futures::future::join_all;
use platform_api::state::StateRepository;
use platform_types::app::{IdentityPublicKey, KeyId, PublicKeyHash};
use platform_types::error::{BasicError, ProtocolError, RepositoryError, StateError};
use platform_types::validation::{ValidationResult, ValidationResultBuilder};
use std::collections::{BTreeMap, BTreeSet};

/// Too many enabled keys.
pub fn key_limit_error(keys: &[IdentityPublicKey], max_public_keys: usize) -> Option<BasicError> {
    let enabled = keys.iter().filter(|k| k.is_enabled()).count();
    (enabled > max_public_keys).then_some(BasicError::MaxIdentityPublicKeyLimitReachedError {
        max_items: max_public_keys,
    })
}

/// Ids used by more than one key, enabled or not.
pub fn duplicate_id_error(keys: &[IdentityPublicKey]) -> Option<BasicError> {
    let mut counts: BTreeMap<KeyId, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.id).or_default() += 1;
    }
    let duplicated_ids: Vec<KeyId> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect();
    (!duplicated_ids.is_empty())
        .then_some(BasicError::DuplicatedIdentityPublicKeyIdError { duplicated_ids })
}

/// Enabled keys whose material repeats that of an earlier enabled key.
pub fn duplicate_data_error(keys: &[IdentityPublicKey]) -> Option<BasicError> {
    let mut seen = BTreeSet::new();
    let duplicated_public_key_ids: Vec<KeyId> = keys
        .iter()
        .filter(|k| k.is_enabled())
        .filter(|k| !seen.insert(k.data.as_slice()))
        .map(|k| k.id)
        .collect();
    (!duplicated_public_key_ids.is_empty()).then_some(
        BasicError::DuplicatedIdentityPublicKeyError {
            duplicated_public_key_ids,
        },
    )
}

/// No enabled master authentication key.
pub fn missing_master_key_error(keys: &[IdentityPublicKey]) -> Option<BasicError> {
    (!keys.iter().any(IdentityPublicKey::is_master))
        .then_some(BasicError::MissingMasterPublicKeyError)
}

/// Key material of the wrong size, and security levels the purpose does not allow.
pub fn key_errors(keys: &[IdentityPublicKey]) -> Vec<BasicError> {
    let mut errors = Vec::new();
    for key in keys {
        let expected = key.key_type.data_size();
        if key.data.len() != expected {
            errors.push(BasicError::InvalidIdentityPublicKeyDataError {
                public_key_id: key.id,
                reason: format!(
                    "{} key must be {} bytes, got {}",
                    key.key_type,
                    expected,
                    key.data.len()
                ),
            });
        }
        if !key.purpose.allowed_security_levels().contains(&key.security_level) {
            errors.push(BasicError::InvalidIdentityPublicKeySecurityLevelError {
                public_key_id: key.id,
                purpose: key.purpose,
                security_level: key.security_level,
            });
        }
    }
    errors
}

/// The limit and uniqueness rules plus the per-key checks.
pub fn validate_public_keys(keys: &[IdentityPublicKey], max_public_keys: usize) -> ValidationResult {
    let mut builder = ValidationResultBuilder::new();
    builder.add_errors(key_limit_error(keys, max_public_keys));
    builder.add_errors(duplicate_id_error(keys));
    builder.add_errors(duplicate_data_error(keys));
    builder.add_errors(key_errors(keys));
    builder.build()
}

/// The rules a complete key set of an identity must satisfy.
pub fn validate_identity_key_set(
    keys: &[IdentityPublicKey],
    max_public_keys: usize,
) -> ValidationResult {
    let mut builder = ValidationResultBuilder::new();
    builder.add_errors(key_limit_error(keys, max_public_keys));
    builder.add_errors(duplicate_id_error(keys));
    builder.add_errors(duplicate_data_error(keys));
    builder.add_errors(missing_master_key_error(keys));
    builder.build()
}

/// Keys whose material is already bound to some identity, resolved in one batch lookup.
pub async fn bound_key_errors(
    repository: &dyn StateRepository,
    keys: &[IdentityPublicKey],
) -> Result<ValidationResult, ProtocolError> {
    let hashes: Vec<PublicKeyHash> = keys.iter().map(IdentityPublicKey::hash).collect();
    let bound = repository
        .fetch_identity_ids_by_public_key_hashes(&hashes)
        .await?;
    if bound.len() != hashes.len() {
        return Err(ProtocolError::Repository(RepositoryError::Decode(format!(
            "key hash lookup returned {} entries for {} hashes",
            bound.len(),
            hashes.len()
        ))));
    }
    let mut builder = ValidationResultBuilder::new();
    for (hash, identity) in hashes.into_iter().zip(bound) {
        if identity.is_some() {
            builder.add_error(StateError::IdentityPublicKeyAlreadyExistsError {
                public_key_hash: hash,
            });
        }
    }
    Ok(builder.build())
}

/// Same as [`bound_key_errors`], one lookup per key issued concurrently.
pub async fn bound_key_errors_per_key(
    repository: &dyn StateRepository,
    keys: &[IdentityPublicKey],
) -> Result<ValidationResult, ProtocolError> {
    let hashes: Vec<PublicKeyHash> = keys.iter().map(IdentityPublicKey::hash).collect();
    let bound = join_all(
        hashes
            .iter()
            .map(|hash| repository.fetch_public_key_identity_id(hash)),
    )
    .await;
    let mut builder = ValidationResultBuilder::new();
    for (hash, identity) in hashes.into_iter().zip(bound) {
        if identity?.is_some() {
            builder.add_error(StateError::IdentityPublicKeyAlreadyExistsError {
                public_key_hash: hash,
            });
        }
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_types::app::{KeyType, Purpose, SecurityLevel};

    fn key(id: KeyId, purpose: Purpose, level: SecurityLevel, fill: u8) -> IdentityPublicKey {
        IdentityPublicKey {
            id,
            key_type: KeyType::EcdsaSecp256k1,
            purpose,
            security_level: level,
            data: vec![fill; 33],
            disabled_at: None,
        }
    }

    fn master(id: KeyId, fill: u8) -> IdentityPublicKey {
        key(id, Purpose::Authentication, SecurityLevel::Master, fill)
    }

    #[test]
    fn duplicate_ids_are_reported_even_when_master_is_present() {
        let keys = vec![
            master(0, 1),
            key(0, Purpose::Encryption, SecurityLevel::Critical, 2),
        ];
        let result = validate_identity_key_set(&keys, 10);
        assert_eq!(result.error_codes(), vec![1041]);
        assert!(missing_master_key_error(&keys).is_none());
    }

    #[test]
    fn disabled_keys_are_exempt_from_data_uniqueness_only() {
        let mut keys = vec![master(0, 1), master(1, 1)];
        assert_eq!(
            duplicate_data_error(&keys),
            Some(BasicError::DuplicatedIdentityPublicKeyError {
                duplicated_public_key_ids: vec![1]
            })
        );

        keys[1].disabled_at = Some(1_700_000_000);
        assert!(duplicate_data_error(&keys).is_none());

        keys[1].id = 0;
        assert!(duplicate_id_error(&keys).is_some());
    }

    #[test]
    fn master_key_must_be_enabled() {
        let mut keys = vec![
            master(0, 1),
            key(1, Purpose::Authentication, SecurityLevel::High, 2),
        ];
        assert!(missing_master_key_error(&keys).is_none());
        keys[0].disabled_at = Some(1);
        assert_eq!(
            missing_master_key_error(&keys),
            Some(BasicError::MissingMasterPublicKeyError)
        );
    }

    #[test]
    fn limit_counts_enabled_keys() {
        let mut keys: Vec<_> = (0..3).map(|i| master(i, i as u8)).collect();
        assert!(key_limit_error(&keys, 2).is_some());
        keys[2].disabled_at = Some(1);
        assert!(key_limit_error(&keys, 2).is_none());
    }

    #[test]
    fn size_and_security_level_rules() {
        let mut short = master(0, 1);
        short.data.truncate(20);
        let withdraw = key(1, Purpose::Withdraw, SecurityLevel::High, 2);
        assert_eq!(
            validate_public_keys(&[short, withdraw], 10).error_codes(),
            vec![1043, 1044]
        );
    }

    #[tokio::test]
    async fn short_batch_lookup_is_a_fault() {
        use platform_test_utils::InMemoryStateRepository;
        use platform_types::app::Identifier;

        let bound = key(1, Purpose::Authentication, SecurityLevel::High, 2);
        let repository =
            InMemoryStateRepository::new().bind_public_key(bound.hash(), Identifier([4u8; 32]));
        let keys = [master(0, 1), bound];

        let result = bound_key_errors(&repository, &keys).await.unwrap();
        assert_eq!(result.error_codes(), vec![4017]);

        repository.truncate_batch_lookups(Some(1));
        let err = bound_key_errors(&repository, &keys).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Repository(RepositoryError::Decode(_))
        ));
    }
}
