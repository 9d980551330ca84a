//! Storage abstraction and the per-document serialising service.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::document::{self, Document, IndexUnit};
use crate::error::{DocsError, Result};
use crate::request::Request;
use crate::settings::DocumentSettings;

/// Durable home for document snapshots.
///
/// Implementations own the id -> snapshot map; the document model never
/// holds state of its own between requests.
pub trait DocumentStorage: Send + Sync {
    /// Current snapshot for `document_id`, if any.
    fn load(&self, document_id: &str) -> Option<Vec<u8>>;

    /// Persist `snapshot` as the current state of `document_id`.
    fn save(&self, document_id: &str, snapshot: Vec<u8>);
}

/// Thread-safe in-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshots: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl DocumentStorage for MemoryStorage {
    fn load(&self, document_id: &str) -> Option<Vec<u8>> {
        self.snapshots.get(document_id).map(|r| r.clone())
    }

    fn save(&self, document_id: &str, snapshot: Vec<u8>) {
        self.snapshots.insert(document_id.to_string(), snapshot);
    }
}

/// Create, read, and batch-update documents over a [`DocumentStorage`].
///
/// Load, mutate, and save for one document id run under that id's lock, so
/// concurrent batch updates to the same document never lose an update.
/// Different documents proceed in parallel.
pub struct DocumentService<S> {
    storage: S,
    locks: DashMap<String, Arc<Mutex<()>>>,
    index_unit: IndexUnit,
    max_batch_requests: Option<usize>,
}

impl<S: DocumentStorage> DocumentService<S> {
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, &DocumentSettings::default())
    }

    pub fn with_settings(storage: S, settings: &DocumentSettings) -> Self {
        Self {
            storage,
            locks: DashMap::new(),
            index_unit: settings.index_unit,
            max_batch_requests: settings.max_batch_requests,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn index_unit(&self) -> IndexUnit {
        self.index_unit
    }

    fn lock_for(&self, document_id: &str) -> Arc<Mutex<()>> {
        let entry = self.locks.entry(document_id.to_string()).or_default();
        Arc::clone(&entry)
    }

    /// Drop our handle and evict the entry once nobody else holds or awaits it.
    ///
    /// The count check and removal run under the shard lock that `lock_for`
    /// also takes, so a caller can never end up waiting on an evicted mutex.
    fn release_lock(&self, document_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks
            .remove_if(document_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn load_document(&self, document_id: &str) -> Result<Document> {
        let bytes = self
            .storage
            .load(document_id)
            .ok_or_else(|| DocsError::DocumentNotFound(document_id.to_string()))?;
        document::load(&bytes, self.index_unit)
    }

    fn save_document(&self, document: &Document) -> Result<()> {
        let bytes = document::snapshot(document)?;
        self.storage.save(&document.document_id, bytes);
        Ok(())
    }

    /// Create and persist an empty document.
    pub async fn create(&self, title: &str) -> Result<Document> {
        let document = document::create(title);
        let lock = self.lock_for(&document.document_id);
        let saved = {
            let _guard = lock.lock().await;
            self.save_document(&document)
        };
        self.release_lock(&document.document_id, lock);
        saved?;
        tracing::info!("document created: {}", document.document_id);
        Ok(document)
    }

    /// Persist a prepared document, replacing any existing one with the same id.
    pub async fn seed(&self, document: Document) -> Result<()> {
        document
            .body
            .validate(self.index_unit)
            .map_err(|e| DocsError::CorruptSnapshot(format!("{}: {}", document.document_id, e)))?;
        let lock = self.lock_for(&document.document_id);
        let saved = {
            let _guard = lock.lock().await;
            self.save_document(&document)
        };
        self.release_lock(&document.document_id, lock);
        saved?;
        tracing::info!("document seeded: {}", document.document_id);
        Ok(())
    }

    /// Current state of a document.
    pub async fn get(&self, document_id: &str) -> Result<Document> {
        let lock = self.lock_for(document_id);
        let loaded = {
            let _guard = lock.lock().await;
            self.load_document(document_id)
        };
        self.release_lock(document_id, lock);
        loaded
    }

    /// Apply `requests` to a document atomically and persist the result.
    ///
    /// Nothing is saved unless every request applies.
    pub async fn batch_update(&self, document_id: &str, requests: &[Request]) -> Result<Document> {
        if let Some(max) = self.max_batch_requests {
            if requests.len() > max {
                return Err(DocsError::MalformedRequest(format!(
                    "batch of {} requests exceeds limit of {}",
                    requests.len(),
                    max
                )));
            }
        }

        let lock = self.lock_for(document_id);
        let updated = {
            let _guard = lock.lock().await;
            self.apply_locked(document_id, requests)
        };
        self.release_lock(document_id, lock);

        let updated = updated?;
        tracing::info!(
            "batch update completed: {} ({} requests, revision {})",
            document_id,
            requests.len(),
            updated.revision_id
        );
        Ok(updated)
    }

    /// Load, apply, and save. The caller holds the document's lock.
    fn apply_locked(&self, document_id: &str, requests: &[Request]) -> Result<Document> {
        let current = self.load_document(document_id)?;
        let updated = document::apply_batch(&current, requests, self.index_unit)?;
        if updated.revision_id != current.revision_id {
            self.save_document(&updated)?;
        }
        Ok(updated)
    }
}
