// Path: crates/test_utils/src/repository.rs
//! An in-memory [`StateRepository`] with fault injection and a lookup counter.

use async_trait::async_trait;
use parking_lot::RwLock;
use platform_api::state::StateRepository;
use platform_types::app::{
    AssetLockOutput, AssetLockProof, DataContract, Document, Identifier, Identity, PublicKeyHash,
};
use platform_types::error::RepositoryError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Committed state held in maps. Identities added through [`with_identity`]
/// also bind their key hashes.
///
/// [`with_identity`]: InMemoryStateRepository::with_identity
#[derive(Default)]
pub struct InMemoryStateRepository {
    contracts: RwLock<BTreeMap<Identifier, DataContract>>,
    identities: RwLock<BTreeMap<Identifier, Identity>>,
    key_bindings: RwLock<BTreeMap<PublicKeyHash, Identifier>>,
    documents: RwLock<BTreeMap<(Identifier, String, Identifier), Document>>,
    asset_locks: RwLock<BTreeMap<Vec<u8>, AssetLockOutput>>,
    used_out_points: RwLock<BTreeSet<Vec<u8>>>,
    failure: RwLock<Option<RepositoryError>>,
    batch_limit: RwLock<Option<usize>>,
    lookups: AtomicUsize,
}

impl InMemoryStateRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a contract.
    pub fn with_data_contract(self, contract: DataContract) -> Self {
        self.contracts.write().insert(contract.id, contract);
        self
    }

    /// Stores an identity and binds all of its keys to it.
    pub fn with_identity(self, identity: Identity) -> Self {
        {
            let mut bindings = self.key_bindings.write();
            for key in &identity.public_keys {
                bindings.insert(key.hash(), identity.id);
            }
        }
        self.identities.write().insert(identity.id, identity);
        self
    }

    /// Binds a key hash to an identity without storing the identity.
    pub fn bind_public_key(self, hash: PublicKeyHash, identity_id: Identifier) -> Self {
        self.key_bindings.write().insert(hash, identity_id);
        self
    }

    /// Stores a document.
    pub fn with_document(self, document: Document) -> Self {
        self.documents.write().insert(
            (
                document.data_contract_id,
                document.document_type.clone(),
                document.id,
            ),
            document,
        );
        self
    }

    /// Makes `out_point` resolve to `output`.
    pub fn with_asset_lock(self, out_point: Vec<u8>, output: AssetLockOutput) -> Self {
        self.asset_locks.write().insert(out_point, output);
        self
    }

    /// Marks `out_point` as already spent on an identity.
    pub fn mark_out_point_used(self, out_point: Vec<u8>) -> Self {
        self.used_out_points.write().insert(out_point);
        self
    }

    /// Every subsequent lookup fails with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<RepositoryError>) {
        *self.failure.write() = error;
    }

    /// Batch key-hash lookups answer at most `limit` entries, like a backend that
    /// drops rows.
    pub fn truncate_batch_lookups(&self, limit: Option<usize>) {
        *self.batch_limit.write() = limit;
    }

    /// Number of lookups served or failed so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn lookup(&self) -> Result<(), RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StateRepository for InMemoryStateRepository {
    async fn fetch_data_contract(
        &self,
        id: &Identifier,
    ) -> Result<Option<DataContract>, RepositoryError> {
        self.lookup()?;
        Ok(self.contracts.read().get(id).cloned())
    }

    async fn fetch_identity(&self, id: &Identifier) -> Result<Option<Identity>, RepositoryError> {
        self.lookup()?;
        Ok(self.identities.read().get(id).cloned())
    }

    async fn fetch_identity_ids_by_public_key_hashes(
        &self,
        hashes: &[PublicKeyHash],
    ) -> Result<Vec<Option<Identifier>>, RepositoryError> {
        self.lookup()?;
        let bindings = self.key_bindings.read();
        let limit = self.batch_limit.read().unwrap_or(hashes.len());
        Ok(hashes
            .iter()
            .take(limit)
            .map(|h| bindings.get(h).copied())
            .collect())
    }

    async fn fetch_public_key_identity_id(
        &self,
        hash: &PublicKeyHash,
    ) -> Result<Option<Identifier>, RepositoryError> {
        self.lookup()?;
        Ok(self.key_bindings.read().get(hash).copied())
    }

    async fn fetch_documents(
        &self,
        data_contract_id: &Identifier,
        document_type: &str,
        ids: &[Identifier],
    ) -> Result<Vec<Document>, RepositoryError> {
        self.lookup()?;
        let documents = self.documents.read();
        Ok(ids
            .iter()
            .filter_map(|id| {
                documents
                    .get(&(*data_contract_id, document_type.to_string(), *id))
                    .cloned()
            })
            .collect())
    }

    async fn fetch_asset_lock_output(
        &self,
        proof: &AssetLockProof,
    ) -> Result<Option<AssetLockOutput>, RepositoryError> {
        self.lookup()?;
        Ok(self.asset_locks.read().get(&proof.out_point).cloned())
    }

    async fn is_asset_lock_out_point_used(
        &self,
        out_point: &[u8],
    ) -> Result<bool, RepositoryError> {
        self.lookup()?;
        Ok(self.used_out_points.read().contains(out_point))
    }
}
