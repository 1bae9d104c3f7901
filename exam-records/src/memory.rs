use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::document::apply_updates;
use crate::{Document, DocumentRef, DocumentStore, FieldUpdates, RecordError, RecordResult};

/// In-memory document store for tests and development.
///
/// Clones share the same documents, so a test can hand one clone to an
/// adapter and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    docs: Arc<RwLock<HashMap<DocumentRef, Document>>>,
    unavailable: Arc<AtomicBool>,
    update_calls: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, replacing any existing one.
    pub fn insert(&self, doc: DocumentRef, data: Document) {
        self.docs.write().insert(doc, data);
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `update` calls that reached the store.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn check_available(&self) -> RecordResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RecordError::unavailable("memory store marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, doc: &DocumentRef) -> RecordResult<Option<Document>> {
        self.check_available()?;
        Ok(self.docs.read().get(doc).cloned())
    }

    async fn exists(&self, doc: &DocumentRef) -> RecordResult<bool> {
        self.check_available()?;
        Ok(self.docs.read().contains_key(doc))
    }

    async fn create(&self, doc: &DocumentRef, data: Document) -> RecordResult<()> {
        self.check_available()?;
        let mut docs = self.docs.write();
        if docs.contains_key(doc) {
            return Err(RecordError::already_exists(doc.path()));
        }
        docs.insert(doc.clone(), data);
        Ok(())
    }

    async fn update(&self, doc: &DocumentRef, updates: FieldUpdates) -> RecordResult<()> {
        self.check_available()?;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.write();
        let existing = docs
            .get_mut(doc)
            .ok_or_else(|| RecordError::not_found(doc.path()))?;
        apply_updates(existing, &updates);
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> RecordResult<()> {
        self.check_available()?;
        self.docs.write().remove(doc);
        Ok(())
    }
}
