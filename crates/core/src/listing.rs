//! Listing engine
//!
//! Turns one raw delimited listing into navigation items: folders first, then
//! files, both in store order, with folder placeholders removed.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ListingError;
use crate::item::NavigationItem;
use crate::traits::{RawListing, StoreClient};

/// Lists folder levels of a single bucket
pub struct ListingEngine {
    store: Arc<dyn StoreClient>,
    bucket: String,
}

impl ListingEngine {
    pub fn new(store: Arc<dyn StoreClient>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// List the direct children of `prefix`
    pub async fn list(&self, prefix: &str) -> Result<Vec<NavigationItem>, ListingError> {
        match self.store.list_one_level(&self.bucket, prefix).await {
            Ok(raw) => {
                let items = to_items(raw, prefix);
                tracing::debug!(
                    bucket = %self.bucket,
                    prefix,
                    items = items.len(),
                    "listed folder"
                );
                Ok(items)
            }
            Err(err) => {
                let err = ListingError::classify(&err);
                tracing::warn!(
                    bucket = %self.bucket,
                    prefix,
                    kind = ?err.kind,
                    likely_misconfiguration = err.likely_misconfiguration,
                    "listing failed: {}",
                    err.message
                );
                Err(err)
            }
        }
    }
}

/// Convert a raw listing of `prefix` into items
///
/// Files whose key is the prefix itself and zero-byte files are folder
/// markers and never shown. A folder equal to the prefix is dropped too.
/// Keys repeated by the store are kept once, at their first position.
pub fn to_items(raw: RawListing, prefix: &str) -> Vec<NavigationItem> {
    let folders = raw
        .folders
        .into_iter()
        .filter(|folder| !folder.prefix.is_empty() && folder.prefix != prefix)
        .map(|folder| NavigationItem::Folder {
            prefix: folder.prefix,
        });

    let files = raw
        .files
        .into_iter()
        .filter(|file| !file.key.is_empty() && file.key != prefix && file.size > 0)
        .map(|file| NavigationItem::File {
            key: file.key,
            size: file.size,
            last_modified: file.last_modified,
        });

    let mut seen = HashSet::new();
    folders
        .chain(files)
        .filter(|item| seen.insert(item.key().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ListingErrorKind};
    use crate::item::ItemKind;
    use crate::traits::{MockStoreClient, RawFile, RawFolder};

    fn folder(prefix: &str) -> RawFolder {
        RawFolder {
            prefix: prefix.into(),
        }
    }

    #[test]
    fn test_folders_first_in_store_order() {
        let raw = RawListing {
            folders: vec![folder("docs/z/"), folder("docs/a/")],
            files: vec![RawFile::new("docs/b.txt", 5), RawFile::new("docs/a.txt", 3)],
        };

        let items = to_items(raw, "docs/");
        let keys: Vec<&str> = items.iter().map(NavigationItem::key).collect();
        assert_eq!(keys, vec!["docs/z/", "docs/a/", "docs/b.txt", "docs/a.txt"]);
        assert_eq!(items[0].kind(), ItemKind::Folder);
        assert_eq!(items[3].kind(), ItemKind::File);
    }

    #[test]
    fn test_placeholders_excluded() {
        let raw = RawListing {
            folders: vec![folder("docs/img/")],
            files: vec![
                RawFile::new("docs/", 0),
                RawFile::new("docs/img/", 0),
                RawFile::new("docs/empty.txt", 0),
                RawFile::new("docs/a.txt", 1),
            ],
        };

        let items = to_items(raw, "docs/");
        assert_eq!(
            items,
            vec![
                NavigationItem::folder("docs/img/"),
                NavigationItem::file("docs/a.txt", 1),
            ]
        );
    }

    #[test]
    fn test_prefix_folder_echo_dropped() {
        let raw = RawListing {
            folders: vec![folder("docs/"), folder("docs/x/")],
            files: vec![],
        };
        assert_eq!(to_items(raw, "docs/"), vec![NavigationItem::folder("docs/x/")]);
    }

    #[test]
    fn test_duplicate_keys_kept_once() {
        let raw = RawListing {
            folders: vec![folder("a/"), folder("b/"), folder("a/")],
            files: vec![
                RawFile::new("x.txt", 1),
                RawFile::new("y.txt", 2),
                RawFile::new("x.txt", 3),
            ],
        };
        let items = to_items(raw, "");
        assert_eq!(
            items.iter().map(NavigationItem::key).collect::<Vec<_>>(),
            vec!["a/", "b/", "x.txt", "y.txt"]
        );
        assert_eq!(items[2].size(), Some(1));
    }

    #[tokio::test]
    async fn test_list_calls_store() {
        let mut store = MockStoreClient::new();
        store
            .expect_list_one_level()
            .withf(|bucket, prefix| bucket == "team" && prefix == "docs/")
            .times(1)
            .returning(|_, _| {
                Ok(RawListing {
                    folders: vec![RawFolder {
                        prefix: "docs/img/".into(),
                    }],
                    files: vec![RawFile::new("docs/a.txt", 10)],
                })
            });

        let engine = ListingEngine::new(Arc::new(store), "team");
        let items = engine.list("docs/").await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_list_classifies_failure() {
        let mut store = MockStoreClient::new();
        store
            .expect_list_one_level()
            .returning(|_, _| Err(Error::Auth("SignatureDoesNotMatch".into())));

        let engine = ListingEngine::new(Arc::new(store), "team");
        let err = engine.list("").await.unwrap_err();
        assert_eq!(err.kind, ListingErrorKind::AuthFailure);
        assert!(err.message.contains("SignatureDoesNotMatch"));
    }
}
