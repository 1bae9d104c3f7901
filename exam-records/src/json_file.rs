use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use crate::document::apply_updates;
use crate::{Document, DocumentRef, DocumentStore, FieldUpdates, RecordError, RecordResult};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Document store persisted to a single JSON file.
///
/// Layout on disk is `{ collection: { id: document } }`. Every mutation
/// rewrites the file through a temporary sibling and a rename while the
/// write lock is held, so a crash leaves either the old or the new state.
pub struct JsonFileDocumentStore {
    inner: RwLock<Collections>,
    file_path: PathBuf,
}

impl JsonFileDocumentStore {
    /// Open the store at `path`, creating an empty file if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> RecordResult<Self> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let collections: Collections = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => Collections::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(RecordError::backend)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Collections::new();
                write_atomically(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %file_path.display(), "opened json document store");
        Ok(Self {
            inner: RwLock::new(collections),
            file_path,
        })
    }

    pub fn file_path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Apply `f` to the collections and persist. Nothing is kept in memory
    /// if either `f` or the write fails.
    async fn mutate<F>(&self, f: F) -> RecordResult<()>
    where
        F: FnOnce(&mut Collections) -> RecordResult<()>,
    {
        let mut guard = self.inner.write().await;
        let mut staged = guard.clone();
        f(&mut staged)?;
        write_atomically(&self.file_path, &staged).await?;
        *guard = staged;
        Ok(())
    }
}

async fn write_atomically(path: &std::path::Path, collections: &Collections) -> RecordResult<()> {
    let data = serde_json::to_vec_pretty(collections).map_err(RecordError::backend)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn get(&self, doc: &DocumentRef) -> RecordResult<Option<Document>> {
        let collections = self.inner.read().await;
        Ok(collections
            .get(&doc.collection)
            .and_then(|c| c.get(&doc.id))
            .cloned())
    }

    async fn create(&self, doc: &DocumentRef, data: Document) -> RecordResult<()> {
        self.mutate(|collections| {
            let collection = collections.entry(doc.collection.clone()).or_default();
            if collection.contains_key(&doc.id) {
                return Err(RecordError::already_exists(doc.path()));
            }
            collection.insert(doc.id.clone(), data);
            Ok(())
        })
        .await
    }

    async fn update(&self, doc: &DocumentRef, updates: FieldUpdates) -> RecordResult<()> {
        self.mutate(|collections| {
            let existing = collections
                .get_mut(&doc.collection)
                .and_then(|c| c.get_mut(&doc.id))
                .ok_or_else(|| RecordError::not_found(doc.path()))?;
            apply_updates(existing, &updates);
            Ok(())
        })
        .await
    }

    async fn delete(&self, doc: &DocumentRef) -> RecordResult<()> {
        self.mutate(|collections| {
            if let Some(collection) = collections.get_mut(&doc.collection) {
                collection.remove(&doc.id);
                if collection.is_empty() {
                    collections.remove(&doc.collection);
                }
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldPath, FieldUpdate};
    use serde_json::json;

    fn users(id: &str) -> DocumentRef {
        DocumentRef::new("users", id)
    }

    #[tokio::test]
    async fn persists_across_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("records.json");

        let store = JsonFileDocumentStore::open(&path).await?;
        let mut doc = Document::new();
        doc.insert("CS101".into(), json!({ "course_code": "CS101" }));
        store.create(&users("alice"), doc).await?;
        store
            .update(
                &users("alice"),
                vec![(FieldPath::parse("CS101.date")?, FieldUpdate::Set(json!("monday")))],
            )
            .await?;
        drop(store);

        let reopened = JsonFileDocumentStore::open(&path).await?;
        let doc = reopened.get(&users("alice")).await?.expect("document persisted");
        assert_eq!(doc["CS101"]["date"], json!("monday"));
        assert!(reopened.get(&users("bob")).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_state_untouched() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileDocumentStore::open(dir.path().join("records.json")).await?;

        let err = store
            .update(&users("ghost"), vec![(FieldPath::key("CS101")?, FieldUpdate::Delete)])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists(&users("ghost")).await?);
        Ok(())
    }

    #[tokio::test]
    async fn create_twice_conflicts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = JsonFileDocumentStore::open(dir.path().join("nested/records.json")).await?;

        store.create(&users("alice"), Document::new()).await?;
        let err = store.create(&users("alice"), Document::new()).await.unwrap_err();
        assert!(matches!(err, RecordError::AlreadyExists { .. }));

        store.delete(&users("alice")).await?;
        store.delete(&users("alice")).await?;
        assert!(store.get(&users("alice")).await?.is_none());
        Ok(())
    }
}
