//! Collaborator traits
//!
//! The engine never talks to a bucket directly. Listing goes through
//! [`StoreClient`] and archive construction through [`ArchiveBuilder`], both
//! implemented by the S3 adapter crate and mocked in tests.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketConfig;
use crate::error::Result;
use crate::export::ExportEntry;

/// A common prefix returned by a delimited listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFolder {
    pub prefix: String,
}

/// An object returned by a delimited listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub key: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl RawFile {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }
}

/// Raw result of listing one folder level, in store order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    pub folders: Vec<RawFolder>,
    pub files: Vec<RawFile>,
}

/// Single delimited listing against a bucket
///
/// Implementations fix the delimiter to "/" and return exactly one level
/// below `prefix`, following continuation tokens internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// List the direct children of `prefix`
    async fn list_one_level(&self, bucket: &str, prefix: &str) -> Result<RawListing>;
}

/// Bulk fetch-and-archive service
///
/// Folder entries must be expanded recursively by the implementation.
/// Archive entry paths are relative to `base_prefix`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveBuilder: Send + Sync {
    /// Build one archive containing every entry
    async fn build_archive(
        &self,
        bucket: &BucketConfig,
        base_prefix: &str,
        entries: &[ExportEntry],
    ) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_file_new() {
        let file = RawFile::new("docs/a.txt", 10);
        assert_eq!(file.key, "docs/a.txt");
        assert_eq!(file.size, 10);
        assert!(file.last_modified.is_none());
    }

    #[tokio::test]
    async fn test_mock_store_client() {
        let mut store = MockStoreClient::new();
        store
            .expect_list_one_level()
            .withf(|bucket, prefix| bucket == "b" && prefix == "docs/")
            .returning(|_, _| {
                Ok(RawListing {
                    folders: vec![RawFolder {
                        prefix: "docs/img/".into(),
                    }],
                    files: vec![],
                })
            });

        let listing = store.list_one_level("b", "docs/").await.unwrap();
        assert_eq!(listing.folders.len(), 1);
    }
}
