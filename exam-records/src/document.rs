//! Field-path reads and writes on an in-process [`Document`].
//!
//! Shared by the bundled stores so they agree on merge semantics: a `Set`
//! creates missing intermediate mappings and replaces non-mapping values in
//! the way, a `Delete` on a missing path does nothing.

use serde_json::{Map, Value};

use crate::store::{Document, FieldPath, FieldUpdate};

/// Resolve a path inside a document. Missing intermediates resolve to `None`.
pub fn read_path<'a>(doc: &'a Document, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = doc.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub fn apply_update(doc: &mut Document, path: &FieldPath, update: &FieldUpdate) {
    match update {
        FieldUpdate::Set(value) => set_path(doc, path.segments(), value.clone()),
        FieldUpdate::Delete => delete_path(doc, path.segments()),
    }
}

pub fn apply_updates<'a, I>(doc: &mut Document, updates: I)
where
    I: IntoIterator<Item = &'a (FieldPath, FieldUpdate)>,
{
    for (path, update) in updates {
        apply_update(doc, path, update);
    }
}

fn set_path(doc: &mut Document, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = doc;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

fn delete_path(doc: &mut Document, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = doc;
    for segment in parents {
        match current.get_mut(segment) {
            Some(Value::Object(next)) => current = next,
            _ => return,
        }
    }
    current.remove(last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents are objects"),
        }
    }

    fn path(dotted: &str) -> FieldPath {
        FieldPath::parse(dotted).unwrap()
    }

    #[test]
    fn read_missing_intermediate_is_none() {
        let d = doc(json!({ "CS101": { "date": "2024-05-01" } }));
        assert_eq!(read_path(&d, &path("CS101.date")), Some(&json!("2024-05-01")));
        assert_eq!(read_path(&d, &path("CS101.time")), None);
        assert_eq!(read_path(&d, &path("MATH201.date")), None);
        assert_eq!(read_path(&d, &path("CS101.date.day")), None);
    }

    #[test]
    fn set_creates_nested_structure() {
        let mut d = Document::new();
        apply_update(&mut d, &path("CS101.venue.room"), &FieldUpdate::Set(json!("N1")));
        assert_eq!(Value::Object(d), json!({ "CS101": { "venue": { "room": "N1" } } }));
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut d = doc(json!({ "CS101": "pending" }));
        apply_update(&mut d, &path("CS101.date"), &FieldUpdate::Set(json!("monday")));
        assert_eq!(Value::Object(d), json!({ "CS101": { "date": "monday" } }));
    }

    #[test]
    fn set_keeps_sibling_fields() {
        let mut d = doc(json!({ "CS101": { "date": "monday", "time": "9am" } }));
        apply_update(&mut d, &path("CS101.time"), &FieldUpdate::Set(json!("1pm")));
        assert_eq!(
            Value::Object(d),
            json!({ "CS101": { "date": "monday", "time": "1pm" } })
        );
    }

    #[test]
    fn delete_is_noop_for_missing_path() {
        let mut d = doc(json!({ "CS101": { "date": "monday" } }));
        apply_update(&mut d, &path("MATH201.date"), &FieldUpdate::Delete);
        apply_update(&mut d, &path("CS101.date"), &FieldUpdate::Delete);
        assert_eq!(Value::Object(d), json!({ "CS101": {} }));
    }
}
