//! # Configuration
//!
//! A flat string key/value store. Keys are dotted (`blob.bucket`,
//! `records.backend`) and values are plain strings; typed reads happen on a
//! [`ExamConfigSnapshot`].
//!
//! ```rust
//! use exam_core::ExamConfig;
//!
//! let mut config = ExamConfig::new();
//! config.set("records.backend", "memory");
//! config.set("blob.bucket", "exam-artifacts");
//!
//! assert_eq!(config.get("blob.bucket"), Some("exam-artifacts"));
//! ```
//!
//! Environment overrides use a prefix and double underscores as separators:
//!
//! ```bash
//! export EXAM__BLOB__BUCKET=exam-artifacts   # -> blob.bucket
//! ```

use std::collections::HashMap;

/// Prefix used by [`ExamConfig::from_env`].
pub const ENV_PREFIX: &str = "EXAM__";

#[derive(Debug, Default, Clone)]
pub struct ExamConfig {
    values: HashMap<String, String>,
}

impl ExamConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Build a config from the process environment using [`ENV_PREFIX`].
    pub fn from_env() -> Self {
        let mut config = Self::new();
        config.load_vars(ENV_PREFIX, std::env::vars());
        config
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merge variables whose name starts with `prefix`.
    ///
    /// `EXAM__RECORDS__PATH` with prefix `EXAM__` becomes `records.path`.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> ExamConfigSnapshot {
        ExamConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExamConfigSnapshot {
    map: HashMap<String, String>,
}

impl ExamConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_are_normalized_to_dotted_keys() {
        let mut config = ExamConfig::new();
        config.load_vars(
            ENV_PREFIX,
            vec![
                ("EXAM__BLOB__BUCKET".to_string(), "exam-artifacts".to_string()),
                ("EXAM__RECORDS__BACKEND".to_string(), "json".to_string()),
                ("HOME".to_string(), "/root".to_string()),
            ],
        );

        assert_eq!(config.get("blob.bucket"), Some("exam-artifacts"));
        assert_eq!(config.get("records.backend"), Some("json"));
        assert!(!config.has("home"));
    }

    #[test]
    fn snapshot_reads_typed_values() {
        let snapshot = ExamConfig::new()
            .with("blob.max_bytes", "1048576")
            .with("blob.public", "true")
            .snapshot();

        assert_eq!(snapshot.get_usize("blob.max_bytes"), Some(1_048_576));
        assert_eq!(snapshot.get_bool("blob.public"), Some(true));
        assert_eq!(snapshot.get_or("records.collection", "users"), "users");
    }
}
