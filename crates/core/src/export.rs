//! Export orchestration
//!
//! Turns the current selection into an ordered archive request and hands it
//! to an [`ArchiveBuilder`]. Expanding folders is the builder's job.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bucket::BucketConfig;
use crate::error::ExportError;
use crate::item::{ItemKind, NavigationItem};
use crate::selection::Selection;
use crate::traits::ArchiveBuilder;

/// One entry of an archive request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportEntry {
    pub key: String,
    pub kind: ItemKind,
}

/// A finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub item_count: usize,
}

impl ExportOutcome {
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }
}

/// Build the archive request for `selection` against the current `items`
///
/// Entries follow item order and appear once each. Selected keys that are no
/// longer in `items` are skipped.
pub fn build_request(selection: &Selection, items: &[NavigationItem]) -> Vec<ExportEntry> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| selection.is_selected(item.key()))
        .filter(|item| seen.insert(item.key()))
        .map(|item| ExportEntry {
            key: item.key().to_string(),
            kind: item.kind(),
        })
        .collect()
}

/// Runs exports for one bucket
pub struct ExportOrchestrator {
    builder: Arc<dyn ArchiveBuilder>,
    bucket: BucketConfig,
}

impl ExportOrchestrator {
    pub fn new(builder: Arc<dyn ArchiveBuilder>, bucket: BucketConfig) -> Self {
        Self { builder, bucket }
    }

    /// Export every selected item still present in `items` as one archive
    ///
    /// `base_prefix` is the folder the selection was made in; archive paths
    /// are relative to it.
    pub async fn export_selection(
        &self,
        selection: &Selection,
        items: &[NavigationItem],
        base_prefix: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let entries = build_request(selection, items);
        if entries.is_empty() {
            return Err(ExportError::EmptySelection);
        }

        tracing::info!(
            bucket = %self.bucket.bucket,
            base_prefix,
            entries = entries.len(),
            "building archive"
        );

        let bytes = self
            .builder
            .build_archive(&self.bucket, base_prefix, &entries)
            .await
            .map_err(|e| {
                tracing::warn!(bucket = %self.bucket.bucket, "archive build failed: {e}");
                ExportError::CollaboratorFailure {
                    reason: e.to_string(),
                }
            })?;

        Ok(ExportOutcome {
            bytes,
            item_count: entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::MockArchiveBuilder;

    fn items() -> Vec<NavigationItem> {
        vec![
            NavigationItem::folder("docs/img/"),
            NavigationItem::file("docs/a.txt", 1),
            NavigationItem::file("docs/b.txt", 2),
        ]
    }

    #[test]
    fn test_build_request_follows_item_order() {
        let mut selection = Selection::new();
        selection.select("docs/b.txt", true);
        selection.select("docs/img/", true);
        selection.select("docs/gone.txt", true);

        let entries = build_request(&selection, &items());
        assert_eq!(
            entries,
            vec![
                ExportEntry {
                    key: "docs/img/".into(),
                    kind: ItemKind::Folder,
                },
                ExportEntry {
                    key: "docs/b.txt".into(),
                    kind: ItemKind::File,
                },
            ]
        );
    }

    #[test]
    fn test_build_request_deduplicates() {
        let mut items = items();
        items.push(NavigationItem::file("docs/a.txt", 1));
        let mut selection = Selection::new();
        selection.select("docs/a.txt", true);

        assert_eq!(build_request(&selection, &items).len(), 1);
    }

    #[tokio::test]
    async fn test_export_success() {
        let mut builder = MockArchiveBuilder::new();
        builder
            .expect_build_archive()
            .withf(|bucket, base, entries| {
                bucket.bucket == "team" && base == "docs/" && entries.len() == 2
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![0x1f, 0x8b, 0x08]));

        let orchestrator =
            ExportOrchestrator::new(Arc::new(builder), BucketConfig::new("t", "team"));
        let mut selection = Selection::new();
        selection.select("docs/a.txt", true);
        selection.select("docs/b.txt", true);

        let outcome = orchestrator
            .export_selection(&selection, &items(), "docs/")
            .await
            .unwrap();
        assert_eq!(outcome.item_count, 2);
        assert_eq!(outcome.byte_count(), 3);
    }

    #[tokio::test]
    async fn test_export_empty_selection_skips_builder() {
        let mut builder = MockArchiveBuilder::new();
        builder.expect_build_archive().never();

        let orchestrator =
            ExportOrchestrator::new(Arc::new(builder), BucketConfig::new("t", "team"));
        let mut selection = Selection::new();
        selection.select("docs/gone.txt", true);

        let err = orchestrator
            .export_selection(&selection, &items(), "docs/")
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::EmptySelection);
    }

    #[tokio::test]
    async fn test_export_builder_failure() {
        let mut builder = MockArchiveBuilder::new();
        builder
            .expect_build_archive()
            .returning(|_, _, _| Err(Error::Network("connection reset".into())));

        let orchestrator =
            ExportOrchestrator::new(Arc::new(builder), BucketConfig::new("t", "team"));
        let mut selection = Selection::new();
        selection.select("docs/a.txt", true);

        let err = orchestrator
            .export_selection(&selection, &items(), "docs/")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::CollaboratorFailure { .. }));
        assert!(err.reason().contains("connection reset"));
    }
}
