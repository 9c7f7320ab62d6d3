// Path: crates/api/src/state/mod.rs

//! Defines the `StateRepository` trait for read access to committed chain state.
//!
//! Lookups are the only points where validation suspends on I/O. Absence is a value
//! (`Ok(None)`, `Ok(false)`), never an error: an `Err` means the backend itself failed
//! and aborts the validation as a fault.

use async_trait::async_trait;
use platform_types::app::{
    AssetLockOutput, AssetLockProof, DataContract, Document, Identifier, Identity, PublicKeyHash,
};
use platform_types::error::RepositoryError;
use std::sync::Arc;

/// Committed state as of the validation point.
///
/// Implementations must be safe to share across concurrently running validations.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Fetches a data contract by id.
    async fn fetch_data_contract(
        &self,
        id: &Identifier,
    ) -> Result<Option<DataContract>, RepositoryError>;

    /// Fetches an identity by id.
    async fn fetch_identity(&self, id: &Identifier) -> Result<Option<Identity>, RepositoryError>;

    /// Resolves each key hash to the identity it is bound to, position for position.
    async fn fetch_identity_ids_by_public_key_hashes(
        &self,
        hashes: &[PublicKeyHash],
    ) -> Result<Vec<Option<Identifier>>, RepositoryError>;

    /// Resolves a single key hash to the identity it is bound to.
    async fn fetch_public_key_identity_id(
        &self,
        hash: &PublicKeyHash,
    ) -> Result<Option<Identifier>, RepositoryError>;

    /// Fetches the stored documents with the given ids; missing ones are simply absent.
    async fn fetch_documents(
        &self,
        data_contract_id: &Identifier,
        document_type: &str,
        ids: &[Identifier],
    ) -> Result<Vec<Document>, RepositoryError>;

    /// Resolves an asset lock proof to the output it locks.
    async fn fetch_asset_lock_output(
        &self,
        proof: &AssetLockProof,
    ) -> Result<Option<AssetLockOutput>, RepositoryError>;

    /// Whether the out point has already funded an identity.
    async fn is_asset_lock_out_point_used(&self, out_point: &[u8])
        -> Result<bool, RepositoryError>;
}

// Blanket implementation to allow `StateRepository` to be shared behind an `Arc`.
#[async_trait]
impl<T: StateRepository + ?Sized> StateRepository for Arc<T> {
    async fn fetch_data_contract(
        &self,
        id: &Identifier,
    ) -> Result<Option<DataContract>, RepositoryError> {
        (**self).fetch_data_contract(id).await
    }

    async fn fetch_identity(&self, id: &Identifier) -> Result<Option<Identity>, RepositoryError> {
        (**self).fetch_identity(id).await
    }

    async fn fetch_identity_ids_by_public_key_hashes(
        &self,
        hashes: &[PublicKeyHash],
    ) -> Result<Vec<Option<Identifier>>, RepositoryError> {
        (**self).fetch_identity_ids_by_public_key_hashes(hashes).await
    }

    async fn fetch_public_key_identity_id(
        &self,
        hash: &PublicKeyHash,
    ) -> Result<Option<Identifier>, RepositoryError> {
        (**self).fetch_public_key_identity_id(hash).await
    }

    async fn fetch_documents(
        &self,
        data_contract_id: &Identifier,
        document_type: &str,
        ids: &[Identifier],
    ) -> Result<Vec<Document>, RepositoryError> {
        (**self)
            .fetch_documents(data_contract_id, document_type, ids)
            .await
    }

    async fn fetch_asset_lock_output(
        &self,
        proof: &AssetLockProof,
    ) -> Result<Option<AssetLockOutput>, RepositoryError> {
        (**self).fetch_asset_lock_output(proof).await
    }

    async fn is_asset_lock_out_point_used(
        &self,
        out_point: &[u8],
    ) -> Result<bool, RepositoryError> {
        (**self).is_asset_lock_out_point_used(out_point).await
    }
}
