//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the StoreClient trait from s3nav-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_types::error::display::DisplayErrorContext;

use s3nav_core::path::DELIMITER;
use s3nav_core::{BucketConfig, Error, RawFile, RawFolder, RawListing, Result, StoreClient};

/// Error codes that mean the credentials were rejected
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "AllAccessDisabled",
];

/// Error codes that mean the bucket or key does not exist
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey", "NotFound"];

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: BucketConfig,
}

impl S3Client {
    /// Create a new S3 client from a bucket configuration
    pub async fn new(bucket: BucketConfig) -> Result<Self> {
        bucket.validate()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(bucket.region.clone()));

        loader = match &bucket.credentials {
            Some(creds) => loader.credentials_provider(aws_credential_types::Credentials::new(
                creds.access_key.clone(),
                creds.secret_key.clone(),
                None, // session token
                None, // expiry
                "s3nav-static-credentials",
            )),
            None => loader.no_credentials(),
        };

        if let Some(endpoint) = &bucket.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;

        // Path-style addressing unless DNS lookup was asked for explicitly
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(bucket.bucket_lookup == "path" || bucket.bucket_lookup == "auto")
            .build();

        tracing::debug!(
            bucket = %bucket.bucket,
            endpoint = bucket.endpoint.as_deref().unwrap_or("default"),
            "created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Bucket configuration this client was built from
    pub fn bucket(&self) -> &BucketConfig {
        &self.bucket
    }

    /// List every object below `prefix`, at any depth
    pub async fn list_recursive(&self, bucket: &str, prefix: &str) -> Result<Vec<RawFile>> {
        let mut files = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.inner.list_objects_v2().bucket(bucket);
            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(map_sdk_error)?;
            files.extend(response.contents().iter().map(to_raw_file));

            continuation_token = next_token(
                response.is_truncated(),
                response.next_continuation_token(),
            );
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(files)
    }

    /// Get object content and its modification time
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let last_modified = response.last_modified().and_then(to_timestamp);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(format!("reading {key}: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(ObjectData {
            data,
            last_modified,
        })
    }
}

#[async_trait]
impl StoreClient for S3Client {
    async fn list_one_level(&self, bucket: &str, prefix: &str) -> Result<RawListing> {
        let mut listing = RawListing::default();
        let mut continuation_token: Option<String> = None;

        // Keep requesting until the level is complete; order is store order
        loop {
            let mut request = self
                .inner
                .list_objects_v2()
                .bucket(bucket)
                .delimiter(DELIMITER);

            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(map_sdk_error)?;

            listing.folders.extend(
                response
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix())
                    .map(|p| RawFolder {
                        prefix: p.to_string(),
                    }),
            );
            listing
                .files
                .extend(response.contents().iter().map(to_raw_file));

            continuation_token = next_token(
                response.is_truncated(),
                response.next_continuation_token(),
            );
            if continuation_token.is_none() {
                break;
            }
        }

        tracing::trace!(
            bucket,
            prefix,
            folders = listing.folders.len(),
            files = listing.files.len(),
            "list_objects_v2 complete"
        );
        Ok(listing)
    }
}

fn to_raw_file(object: &aws_sdk_s3::types::Object) -> RawFile {
    RawFile {
        key: object.key().unwrap_or_default().to_string(),
        size: object.size().unwrap_or(0).max(0) as u64,
        last_modified: object.last_modified().and_then(to_timestamp),
    }
}

/// Body of a fetched object
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub data: Vec<u8>,
    pub last_modified: Option<jiff::Timestamp>,
}

/// Convert an SDK timestamp
fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

fn next_token(truncated: Option<bool>, token: Option<&str>) -> Option<String> {
    if truncated.unwrap_or(false) {
        token.map(str::to_string)
    } else {
        None
    }
}

/// Map an SDK error onto the core error kinds
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Error::Network(DisplayErrorContext(&err).to_string())
        }
        _ => classify_code(err.code(), err.message().unwrap_or_default())
            .unwrap_or_else(|| Error::General(DisplayErrorContext(&err).to_string())),
    }
}

/// Classify a service error code; `None` when the code is unknown
fn classify_code(code: Option<&str>, message: &str) -> Option<Error> {
    let code = code?;
    let detail = if message.is_empty() {
        code.to_string()
    } else {
        format!("{code}: {message}")
    };

    if AUTH_CODES.contains(&code) {
        Some(Error::Auth(detail))
    } else if NOT_FOUND_CODES.contains(&code) {
        Some(Error::NotFound(detail))
    } else {
        Some(Error::General(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_code() {
        assert!(matches!(
            classify_code(Some("InvalidAccessKeyId"), "bad key"),
            Some(Error::Auth(_))
        ));
        assert!(matches!(
            classify_code(Some("NoSuchBucket"), ""),
            Some(Error::NotFound(msg)) if msg == "NoSuchBucket"
        ));
        assert!(matches!(
            classify_code(Some("SlowDown"), "reduce rate"),
            Some(Error::General(msg)) if msg == "SlowDown: reduce rate"
        ));
        assert!(classify_code(None, "whatever").is_none());
    }

    #[test]
    fn test_next_token() {
        assert_eq!(next_token(Some(true), Some("abc")), Some("abc".to_string()));
        assert_eq!(next_token(Some(false), Some("abc")), None);
        assert_eq!(next_token(None, None), None);
        assert_eq!(next_token(Some(true), None), None);
    }

    #[test]
    fn test_to_raw_file() {
        let object = aws_sdk_s3::types::Object::builder()
            .key("docs/a.txt")
            .size(42)
            .last_modified(aws_smithy_types::DateTime::from_secs(1_700_000_000))
            .build();

        let file = to_raw_file(&object);
        assert_eq!(file.key, "docs/a.txt");
        assert_eq!(file.size, 42);
        assert_eq!(file.last_modified.unwrap().as_second(), 1_700_000_000);
    }

    #[test]
    fn test_negative_size_clamped() {
        let object = aws_sdk_s3::types::Object::builder()
            .key("x")
            .size(-1)
            .build();
        assert_eq!(to_raw_file(&object).size, 0);
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let bucket = BucketConfig::new("broken", "");
        assert!(S3Client::new(bucket).await.is_err());
    }
}
