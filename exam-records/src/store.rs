use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{RecordError, RecordResult};

/// A whole document: top-level field name to value.
pub type Document = Map<String, Value>;

/// Address of one document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new<C: Into<String>, I: Into<String>>(collection: C, id: I) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// `collection/id`, used in logs and error messages.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A dotted path into a document (`course.date` -> `["course", "date"]`).
///
/// Segments are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// A single top-level key, taken verbatim (dots are not split).
    pub fn key<S: Into<String>>(key: S) -> RecordResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(RecordError::invalid("field name must not be empty"));
        }
        Ok(Self(vec![key]))
    }

    /// Parse a dotted path.
    pub fn parse(dotted: &str) -> RecordResult<Self> {
        let mut path = Self(Vec::new());
        path.push_dotted(dotted)?;
        Ok(path)
    }

    /// Extend this path with a dotted suffix.
    pub fn child(mut self, dotted: &str) -> RecordResult<Self> {
        self.push_dotted(dotted)?;
        Ok(self)
    }

    fn push_dotted(&mut self, dotted: &str) -> RecordResult<()> {
        if dotted.is_empty() {
            return Err(RecordError::invalid("field path must not be empty"));
        }
        for segment in dotted.split('.') {
            if segment.is_empty() {
                return Err(RecordError::invalid(format!(
                    "field path '{}' contains an empty segment",
                    dotted
                )));
            }
            self.0.push(segment.to_string());
        }
        Ok(())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The top-level field this path lives under.
    pub fn root(&self) -> &str {
        &self.0[0]
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One field-level mutation inside an update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Write a value, creating intermediate mappings as needed.
    Set(Value),
    /// Remove the field if present.
    Delete,
}

/// Field updates applied together by [`DocumentStore::update`].
pub type FieldUpdates = Vec<(FieldPath, FieldUpdate)>;

/// Key-structured document store operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a whole document, `None` if it does not exist.
    async fn get(&self, doc: &DocumentRef) -> RecordResult<Option<Document>>;

    async fn exists(&self, doc: &DocumentRef) -> RecordResult<bool> {
        Ok(self.get(doc).await?.is_some())
    }

    /// Create a document. Fails with `AlreadyExists` if it is present.
    async fn create(&self, doc: &DocumentRef, data: Document) -> RecordResult<()>;

    /// Apply field updates to an existing document.
    ///
    /// All updates in one call land together or not at all. Fails with
    /// `DocumentNotFound` if the document does not exist.
    async fn update(&self, doc: &DocumentRef, updates: FieldUpdates) -> RecordResult<()>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, doc: &DocumentRef) -> RecordResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_paths() {
        let path = FieldPath::parse("CS101.venue.room").unwrap();
        assert_eq!(path.segments(), ["CS101", "venue", "room"]);
        assert_eq!(path.root(), "CS101");
        assert_eq!(path.to_string(), "CS101.venue.room");
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse("a.").is_err());
        assert!(FieldPath::key("").is_err());
    }

    #[test]
    fn child_extends_a_key() {
        let path = FieldPath::key("UGBS303").unwrap().child("date").unwrap();
        assert_eq!(path.segments(), ["UGBS303", "date"]);
    }
}
