use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BlobError, BlobResult};

/// Top-level folder an artifact is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[default]
    Screenshots,
    Calendars,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Screenshots => "screenshots",
            Namespace::Calendars => "calendars",
        }
    }

    /// `{namespace}/{remote_name}` after checking the name.
    pub fn object_key(&self, remote_name: &str) -> BlobResult<String> {
        validate_remote_name(remote_name)?;
        Ok(format!("{}/{}", self.prefix(), remote_name))
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Namespace {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('/') {
            "screenshots" => Ok(Namespace::Screenshots),
            "calendars" => Ok(Namespace::Calendars),
            other => Err(BlobError::invalid(format!("unknown namespace '{}'", other))),
        }
    }
}

/// Remote names stay inside their namespace: no empty names, no leading
/// slash, no `.` or `..` segments.
fn validate_remote_name(name: &str) -> BlobResult<()> {
    if name.trim().is_empty() {
        return Err(BlobError::invalid("remote name must not be empty"));
    }
    if name.starts_with('/') {
        return Err(BlobError::invalid(format!("remote name '{}' must be relative", name)));
    }
    if name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(BlobError::invalid(format!(
            "remote name '{}' contains an empty or relative segment",
            name
        )));
    }
    Ok(())
}

/// Content type guessed from the file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Percent-encode each segment of an object key for use in a URL path.
pub fn encode_object_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// What an upload left behind: where the artifact lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReceipt {
    pub namespace: Namespace,
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub uploaded_at: i64,
    /// False when the upload succeeded but the local copy could not be removed.
    pub local_removed: bool,
}
