//! Typed view of a course entry.
//!
//! The adapter stores entries as open mappings; this type names the fields
//! every entry carries and keeps everything else in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Document, RecordError, RecordResult};

pub const COURSE_CODE: &str = "course_code";
pub const EXACT_EXAMS_VENUE: &str = "Exact_Exams_Venue";
pub const NO_ID_VENUES: &str = "No_ID_Venues";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub course_code: String,

    #[serde(rename = "Exact_Exams_Venue", default)]
    pub exact_exams_venue: String,

    /// `None` means "no venues", stored as `null` rather than `[]`.
    #[serde(rename = "No_ID_Venues", default)]
    pub no_id_venues: Option<Vec<String>>,

    /// Date, time, venue-with-id and anything else collaborators attach.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CourseEntry {
    pub fn new<S: Into<String>>(course_code: S) -> Self {
        Self {
            course_code: course_code.into(),
            ..Self::default()
        }
    }

    pub fn with_exact_venue<S: Into<String>>(mut self, venue: S) -> Self {
        self.exact_exams_venue = venue.into();
        self
    }

    /// Set the no-ID venues; an empty list is stored as `None`.
    pub fn with_no_id_venues<I, S>(mut self, venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let venues: Vec<String> = venues.into_iter().map(Into::into).collect();
        self.no_id_venues = if venues.is_empty() { None } else { Some(venues) };
        self
    }

    pub fn with_field<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn into_document(self) -> RecordResult<Document> {
        match serde_json::to_value(self).map_err(RecordError::backend)? {
            Value::Object(map) => Ok(map),
            _ => Err(RecordError::invalid("course entry did not serialize to a mapping")),
        }
    }

    pub fn from_document(doc: Document) -> RecordResult<Self> {
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| RecordError::invalid(format!("malformed course entry: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_stored_field_names() {
        let doc = CourseEntry::new("UGBS303")
            .with_exact_venue("JQB 23")
            .with_no_id_venues(Vec::<String>::new())
            .with_field("date", json!("2024-05-01"))
            .into_document()
            .unwrap();

        assert_eq!(
            Value::Object(doc),
            json!({
                "course_code": "UGBS303",
                "Exact_Exams_Venue": "JQB 23",
                "No_ID_Venues": null,
                "date": "2024-05-01",
            })
        );
    }

    #[test]
    fn reads_back_extra_fields() {
        let doc = match json!({
            "course_code": "DCIT101",
            "Exact_Exams_Venue": "N1",
            "No_ID_Venues": ["N1", "N2"],
            "time": "9:00",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let entry = CourseEntry::from_document(doc).unwrap();
        assert_eq!(entry.course_code, "DCIT101");
        assert_eq!(entry.no_id_venues, Some(vec!["N1".to_string(), "N2".to_string()]));
        assert_eq!(entry.extra.get("time"), Some(&json!("9:00")));
    }
}
