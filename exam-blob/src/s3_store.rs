use std::path::Path;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;

use crate::types::encode_object_key;
use crate::{BlobError, BlobResult, BlobStore, ObjectHead, PutResult};

const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (GCS interop, MinIO, R2). `None` means AWS.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Prefix for public URLs; defaults to one derived from the endpoint.
    pub public_base_url: Option<String>,
    pub force_path_style: bool,
}

impl S3Config {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self {
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_base_url: None,
            force_path_style: false,
        }
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }

    /// Use a custom endpoint; implies path-style addressing.
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self.force_path_style = true;
        self
    }

    pub fn with_credentials<A: Into<String>, S: Into<String>>(mut self, access_key_id: A, secret: S) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret.into());
        self
    }

    pub fn with_public_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Base that object keys are appended to when building public URLs.
    pub fn resolved_public_base(&self) -> String {
        let base = match (&self.public_base_url, &self.endpoint) {
            (Some(url), _) => url.clone(),
            (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            (None, None) => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        };
        base.trim_end_matches('/').to_string()
    }
}

/// Blob store backed by any S3-compatible service
pub struct S3CompatibleStore {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3CompatibleStore {
    /// Build a client. Static credentials are used when both keys are set,
    /// otherwise the default AWS provider chain.
    pub async fn connect(config: S3Config) -> BlobResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(BlobError::invalid("bucket name must not be empty"));
        }

        let mut builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(Credentials::new(
                    key_id.clone(),
                    secret.clone(),
                    None,
                    None,
                    "exam-blob-static",
                )),
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };
        builder = builder
            .region(Region::new(config.region.clone()))
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        tracing::info!(bucket = %config.bucket, endpoint = ?config.endpoint, "connected s3 blob store");
        Ok(Self {
            client: Client::from_conf(builder.build()),
            public_base: config.resolved_public_base(),
            bucket: config.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn upload_from_path(
        &self,
        key: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        let size_bytes = tokio::fs::metadata(path).await?.len();
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| BlobError::upload_failed(format!("{}: {}", path.display(), e)))?;

        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(body)
            .send()
            .await
            .map_err(|e| BlobError::upload_failed(format!("{}: {}", key, DisplayErrorContext(&e))))?;

        Ok(PutResult {
            etag: output.e_tag().map(str::to_string),
            size_bytes,
        })
    }

    async fn make_public(&self, key: &str) -> BlobResult<()> {
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| BlobError::visibility_failed(key, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn public_url(&self, key: &str) -> BlobResult<String> {
        Ok(format!("{}/{}", self.public_base, encode_object_key(key)))
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) {
                    BlobError::not_found(key)
                } else {
                    BlobError::transport(format!("head {}: {}", key, DisplayErrorContext(&e)))
                }
            })?;

        Ok(ObjectHead {
            size_bytes: output.content_length().unwrap_or_default().max(0) as u64,
            content_type: output.content_type().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            // HeadObject does not carry ACLs.
            public: None,
        })
    }

    /// S3 reports success for missing keys, so existence is checked first.
    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.head(key).await?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::transport(format!("delete {}: {}", key, DisplayErrorContext(&e))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_base_defaults_to_aws_virtual_host() {
        let config = S3Config::new("exam-artifacts").with_region("eu-west-1");
        assert_eq!(
            config.resolved_public_base(),
            "https://exam-artifacts.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn public_base_follows_custom_endpoint() {
        let config = S3Config::new("exam-artifacts").with_endpoint("https://storage.googleapis.com/");
        assert!(config.force_path_style);
        assert_eq!(
            config.resolved_public_base(),
            "https://storage.googleapis.com/exam-artifacts"
        );
    }

    #[test]
    fn explicit_public_base_wins() {
        let config = S3Config::new("exam-artifacts")
            .with_endpoint("http://localhost:9000")
            .with_public_base_url("https://cdn.example.com/artifacts/");
        assert_eq!(config.resolved_public_base(), "https://cdn.example.com/artifacts");
    }

    #[tokio::test]
    async fn connect_rejects_empty_bucket() {
        let err = S3CompatibleStore::connect(S3Config::new(" ").with_credentials("k", "s"))
            .await
            .err()
            .expect("empty bucket rejected");
        assert!(matches!(err, BlobError::Invalid { .. }));
    }
}
