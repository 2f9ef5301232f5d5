//! Navigation items
//!
//! A listing of one folder level yields folders (common prefixes) and files
//! (objects). Both are represented by [`NavigationItem`].

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::path::relative_to;

/// Discriminator shared by items and export requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    File,
}

/// One entry of a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavigationItem {
    /// A sub-prefix, always ending in "/"
    Folder { prefix: String },

    /// An object directly inside the listed folder
    File {
        key: String,
        size: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_modified: Option<Timestamp>,
    },
}

impl NavigationItem {
    /// Create a folder item
    pub fn folder(prefix: impl Into<String>) -> Self {
        Self::Folder {
            prefix: prefix.into(),
        }
    }

    /// Create a file item without a modification time
    pub fn file(key: impl Into<String>, size: u64) -> Self {
        Self::File {
            key: key.into(),
            size,
            last_modified: None,
        }
    }

    /// Full key (object key or folder prefix); the identity used by selection
    pub fn key(&self) -> &str {
        match self {
            Self::Folder { prefix } => prefix,
            Self::File { key, .. } => key,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Folder { .. } => ItemKind::Folder,
            Self::File { .. } => ItemKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Name shown inside `current_prefix`
    ///
    /// Folders lose their trailing "/", files keep any nested path they have.
    pub fn display_name(&self, current_prefix: &str) -> String {
        match self {
            Self::Folder { prefix } => relative_to(prefix, current_prefix)
                .trim_end_matches('/')
                .to_string(),
            Self::File { key, .. } => relative_to(key, current_prefix).to_string(),
        }
    }

    /// Size in bytes; folders report none
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Folder { .. } => None,
            Self::File { size, .. } => Some(*size),
        }
    }

    /// Human-readable size
    pub fn size_human(&self) -> Option<String> {
        self.size()
            .map(|size| humansize::format_size(size, humansize::BINARY))
    }

    pub fn last_modified(&self) -> Option<Timestamp> {
        match self {
            Self::Folder { .. } => None,
            Self::File { last_modified, .. } => *last_modified,
        }
    }
}
