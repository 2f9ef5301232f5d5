//! Archive export
//!
//! Builds a gzip-compressed tar of the requested keys. Folder entries are
//! expanded with a recursive listing; objects are fetched concurrently and
//! written in request order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use futures::{StreamExt, TryStreamExt, stream};
use jiff::Timestamp;

use s3nav_core::path::relative_to;
use s3nav_core::{ArchiveBuilder, BucketConfig, Error, ExportEntry, ItemKind, RawFile, Result};

use crate::client::S3Client;

/// Default number of concurrent object downloads
pub const DEFAULT_CONCURRENCY: usize = 4;

/// File mode recorded for every archive entry
const ENTRY_MODE: u32 = 0o644;

/// One object to be written into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Path inside the archive
    pub path: String,
    pub data: Vec<u8>,
    pub mtime: u64,
}

/// ArchiveBuilder backed by an S3 client
pub struct S3ArchiveBuilder {
    client: Arc<S3Client>,
    concurrency: usize,
}

impl S3ArchiveBuilder {
    pub fn new(client: Arc<S3Client>) -> Self {
        Self {
            client,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Expand folder entries into the objects below them
    async fn expand(&self, bucket: &str, entries: &[ExportEntry]) -> Result<Vec<RawFile>> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for entry in entries {
            let found = match entry.kind {
                ItemKind::File => vec![RawFile::new(entry.key.clone(), 0)],
                ItemKind::Folder => self
                    .client
                    .list_recursive(bucket, &entry.key)
                    .await?
                    .into_iter()
                    .filter(|file| !file.key.ends_with('/'))
                    .collect(),
            };
            files.extend(found.into_iter().filter(|file| seen.insert(file.key.clone())));
        }

        Ok(files)
    }
}

#[async_trait]
impl ArchiveBuilder for S3ArchiveBuilder {
    async fn build_archive(
        &self,
        bucket: &BucketConfig,
        base_prefix: &str,
        entries: &[ExportEntry],
    ) -> Result<Vec<u8>> {
        let files = self.expand(&bucket.bucket, entries).await?;
        tracing::debug!(
            bucket = %bucket.bucket,
            requested = entries.len(),
            objects = files.len(),
            "expanded export request"
        );

        let client = &self.client;
        let contents: Vec<ArchiveFile> = stream::iter(files)
            .map(|file| async move {
                let path = archive_path(&file.key, base_prefix).ok_or_else(|| {
                    Error::InvalidPath(format!("cannot archive key '{}'", file.key))
                })?;
                let object = client.get_object(&bucket.bucket, &file.key).await?;
                Ok::<_, Error>(ArchiveFile {
                    path,
                    data: object.data,
                    mtime: entry_mtime(file.last_modified, object.last_modified),
                })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        tokio::task::spawn_blocking(move || write_tar_gz(&contents))
            .await
            .map_err(|e| Error::General(format!("archive task failed: {e}")))?
    }
}

/// Path of `key` inside an archive rooted at `base_prefix`
///
/// Returns `None` for keys that would escape the archive root or are empty.
pub fn archive_path(key: &str, base_prefix: &str) -> Option<String> {
    let relative = relative_to(key, base_prefix).trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    if relative
        .split('/')
        .any(|segment| segment == ".." || segment == ".")
    {
        return None;
    }
    Some(relative.to_string())
}

/// Seconds recorded for an entry; the listed time wins over the fetched one
///
/// Selected files are not listed again before export, so only the fetch
/// knows their time.
pub fn entry_mtime(listed: Option<Timestamp>, fetched: Option<Timestamp>) -> u64 {
    listed
        .or(fetched)
        .map(|t| t.as_second().max(0) as u64)
        .unwrap_or(0)
}

/// Write files into an in-memory tar.gz
pub fn write_tar_gz(files: &[ArchiveFile]) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for file in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(file.data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(file.mtime);
        builder.append_data(&mut header, &file.path, file.data.as_slice())?;
    }

    let bytes = builder.into_inner()?.finish()?;
    Ok(bytes)
}
