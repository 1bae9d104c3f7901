use std::future::Future;
use std::sync::Arc;

use exam_core::{Classify, ErrorKind};
use serde::Serialize;
use serde_json::Value;

use crate::document::read_path;
use crate::keys::{course_key, is_reserved_field};
use crate::{
    Document, DocumentRef, DocumentStore, FieldPath, FieldUpdate, RecordError, RecordResult,
};

/// Collection holding one record per user.
pub const USERS_COLLECTION: &str = "users";

/// Field-scoped access to per-user exam records.
///
/// Course entries live under a key derived from the free-text course label
/// (see [`sanitize_course_key`](crate::sanitize_course_key)). Reads resolve
/// a missing record or field to `Ok(None)`; every other failure is logged
/// here once and returned with its kind.
#[derive(Clone)]
pub struct RecordAdapter {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl RecordAdapter {
    pub fn new<S: DocumentStore + 'static>(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Build on a store handle shared with other components.
    pub fn from_shared(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            collection: USERS_COLLECTION.to_string(),
        }
    }

    pub fn with_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Read `<course key>.<subfield>` from a user's record.
    ///
    /// A stored `null` reads back as `None`, same as a missing field.
    pub async fn get_field(
        &self,
        user_id: &str,
        raw_course: &str,
        subfield: &str,
    ) -> RecordResult<Option<Value>> {
        logged("get_field", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let path = course_path(raw_course, subfield)?;
            let Some(record) = self.store.get(&doc).await? else {
                return Ok(None);
            };
            Ok(read_path(&record, &path).filter(|v| !v.is_null()).cloned())
        })
        .await
    }

    /// Write `<course key>.<subfield>` on an existing record.
    ///
    /// Missing intermediate mappings are created; a missing record is a
    /// `NotFound` error.
    pub async fn set_field<T: Serialize + ?Sized>(
        &self,
        user_id: &str,
        raw_course: &str,
        subfield: &str,
        value: &T,
    ) -> RecordResult<()> {
        logged("set_field", user_id, async {
            let value = to_value(value)?;
            let path = course_path(raw_course, subfield)?;
            self.update_one(user_id, path, FieldUpdate::Set(value)).await
        })
        .await
    }

    /// Like [`set_field`](Self::set_field) for sequences; an empty sequence
    /// is stored as `null` so "no items" differs from "not computed yet".
    pub async fn set_list_field<T: Serialize>(
        &self,
        user_id: &str,
        raw_course: &str,
        subfield: &str,
        items: &[T],
    ) -> RecordResult<()> {
        logged("set_list_field", user_id, async {
            let value = if items.is_empty() {
                Value::Null
            } else {
                to_value(items)?
            };
            let path = course_path(raw_course, subfield)?;
            self.update_one(user_id, path, FieldUpdate::Set(value)).await
        })
        .await
    }

    pub async fn get_whole_record(&self, user_id: &str) -> RecordResult<Option<Document>> {
        logged("get_whole_record", user_id, async {
            let doc = self.doc_ref(user_id)?;
            self.store.get(&doc).await
        })
        .await
    }

    /// The whole entry stored for one course, if any.
    pub async fn get_course_entry(
        &self,
        user_id: &str,
        raw_course: &str,
    ) -> RecordResult<Option<Document>> {
        logged("get_course_entry", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let key = course_key(raw_course)?;
            let Some(mut record) = self.store.get(&doc).await? else {
                return Ok(None);
            };
            match record.remove(&key) {
                Some(Value::Object(entry)) => Ok(Some(entry)),
                _ => Ok(None),
            }
        })
        .await
    }

    /// Store `entry` under the course key, creating the record if needed.
    ///
    /// An existing record keeps its other keys; the course key is replaced
    /// wholesale.
    pub async fn upsert_course_entry<T: Serialize + ?Sized>(
        &self,
        user_id: &str,
        raw_course: &str,
        entry: &T,
    ) -> RecordResult<()> {
        logged("upsert_course_entry", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let key = course_key(raw_course)?;
            let entry = match to_value(entry)? {
                Value::Object(map) => Value::Object(map),
                other => {
                    return Err(RecordError::invalid(format!(
                        "course entry must be a mapping, got {}",
                        type_name(&other)
                    )))
                }
            };
            self.create_or_update(&doc, key, entry).await
        })
        .await
    }

    /// Remove one course entry. A missing record is left alone.
    pub async fn delete_course_entry(&self, user_id: &str, raw_course: &str) -> RecordResult<()> {
        logged("delete_course_entry", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let key = course_key(raw_course)?;
            if !self.store.exists(&doc).await? {
                return Ok(());
            }
            self.store
                .update(&doc, vec![(FieldPath::key(key)?, FieldUpdate::Delete)])
                .await
        })
        .await
    }

    /// Remove every top-level key of a user's record, reserved fields
    /// included, in a single batched update. A missing record is a no-op.
    pub async fn delete_all_course_entries(&self, user_id: &str) -> RecordResult<()> {
        logged("delete_all_course_entries", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let Some(record) = self.store.get(&doc).await? else {
                tracing::debug!(user_id, "no record to clear");
                return Ok(());
            };
            if record.is_empty() {
                return Ok(());
            }
            let updates = record
                .keys()
                .map(|key| FieldPath::key(key.as_str()).map(|path| (path, FieldUpdate::Delete)))
                .collect::<RecordResult<Vec<_>>>()?;
            let cleared = updates.len();
            self.store.update(&doc, updates).await?;
            tracing::debug!(user_id, cleared, "cleared course entries");
            Ok(())
        })
        .await
    }

    /// Read a reserved top-level field such as `All_Exams_Venue`.
    pub async fn get_record_field(&self, user_id: &str, field: &str) -> RecordResult<Option<Value>> {
        logged("get_record_field", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let path = reserved_path(field)?;
            let Some(record) = self.store.get(&doc).await? else {
                return Ok(None);
            };
            Ok(read_path(&record, &path).filter(|v| !v.is_null()).cloned())
        })
        .await
    }

    /// Write a reserved top-level field, creating the record if needed.
    pub async fn set_record_field<T: Serialize + ?Sized>(
        &self,
        user_id: &str,
        field: &str,
        value: &T,
    ) -> RecordResult<()> {
        logged("set_record_field", user_id, async {
            let doc = self.doc_ref(user_id)?;
            let path = reserved_path(field)?;
            let value = to_value(value)?;
            self.create_or_update(&doc, path.root().to_string(), value).await
        })
        .await
    }

    /// Create a record from a whole document. Fails if one already exists.
    ///
    /// Top-level keys must be non-empty so that every field stays
    /// addressable by later updates.
    pub async fn create_record(&self, user_id: &str, data: Document) -> RecordResult<()> {
        logged("create_record", user_id, async {
            let doc = self.doc_ref(user_id)?;
            if data.contains_key("") {
                return Err(RecordError::invalid("record fields must have non-empty names"));
            }
            self.store.create(&doc, data).await
        })
        .await
    }

    /// Delete the whole record. Deleting a missing record succeeds.
    pub async fn delete_record(&self, user_id: &str) -> RecordResult<()> {
        logged("delete_record", user_id, async {
            let doc = self.doc_ref(user_id)?;
            self.store.delete(&doc).await
        })
        .await
    }

    fn doc_ref(&self, user_id: &str) -> RecordResult<DocumentRef> {
        if user_id.trim().is_empty() {
            return Err(RecordError::invalid("user id must not be empty"));
        }
        if user_id.contains('/') {
            return Err(RecordError::invalid(format!(
                "user id '{}' must not contain '/'",
                user_id
            )));
        }
        Ok(DocumentRef::new(self.collection.as_str(), user_id))
    }

    async fn update_one(
        &self,
        user_id: &str,
        path: FieldPath,
        update: FieldUpdate,
    ) -> RecordResult<()> {
        let doc = self.doc_ref(user_id)?;
        self.store.update(&doc, vec![(path, update)]).await
    }

    /// Set one top-level key, creating the record when it is missing.
    ///
    /// A plain update against a missing record fails at the store, hence
    /// the existence check. If another writer creates the record between
    /// the check and the create, the write falls through to an update.
    async fn create_or_update(&self, doc: &DocumentRef, key: String, value: Value) -> RecordResult<()> {
        let path = FieldPath::key(key.as_str())?;
        if self.store.exists(doc).await? {
            return self.store.update(doc, vec![(path, FieldUpdate::Set(value))]).await;
        }

        let mut data = Document::new();
        data.insert(key, value.clone());
        match self.store.create(doc, data).await {
            Err(RecordError::AlreadyExists { .. }) => {
                tracing::debug!(doc = %doc, "record appeared before create; updating instead");
                self.store.update(doc, vec![(path, FieldUpdate::Set(value))]).await
            }
            other => other,
        }
    }
}

fn course_path(raw_course: &str, subfield: &str) -> RecordResult<FieldPath> {
    FieldPath::key(course_key(raw_course)?)?.child(subfield)
}

fn reserved_path(field: &str) -> RecordResult<FieldPath> {
    let path = FieldPath::key(field)?;
    if !is_reserved_field(path.root()) {
        return Err(RecordError::invalid(format!(
            "'{}' is not a reserved record field",
            field
        )));
    }
    Ok(path)
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> RecordResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| RecordError::invalid(format!("value is not representable: {}", e)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Run one adapter operation and log its failure once, at the level its
/// kind deserves.
async fn logged<T, F>(op: &'static str, user_id: &str, operation: F) -> RecordResult<T>
where
    F: Future<Output = RecordResult<T>>,
{
    let result = operation.await;
    if let Err(err) = &result {
        let kind = err.kind();
        match kind {
            ErrorKind::Transport | ErrorKind::Fatal => {
                tracing::error!(op, user_id, kind = kind.class_name(), error = %err, "record operation failed")
            }
            _ => {
                tracing::warn!(op, user_id, kind = kind.class_name(), error = %err, "record operation failed")
            }
        }
    }
    result
}
