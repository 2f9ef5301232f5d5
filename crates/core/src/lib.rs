//! s3nav-core: browsing engine for S3-compatible buckets
//!
//! This crate turns a flat key namespace into a navigable folder view:
//! - Listing one folder level into typed items
//! - Navigation inside a fixed root prefix, with breadcrumbs
//! - Search and pagination over the current folder
//! - Multi-selection and export of the selection as one archive
//! - Bucket configuration and its persistence
//!
//! The crate does not depend on any S3 SDK. Listing and archive construction
//! go through the [`StoreClient`] and [`ArchiveBuilder`] traits.

pub mod bucket;
pub mod config;
pub mod error;
pub mod export;
pub mod item;
pub mod listing;
pub mod navigation;
pub mod path;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod traits;

pub use bucket::{BucketConfig, BucketManager, Credentials};
pub use config::{BucketRepository, Config, ConfigManager, MemoryRepository};
pub use error::{Error, ExportError, ListingError, ListingErrorKind, Result};
pub use export::{ExportEntry, ExportOrchestrator, ExportOutcome, build_request};
pub use item::{ItemKind, NavigationItem};
pub use listing::ListingEngine;
pub use navigation::{ListingPhase, ListingTicket, NavigationState};
pub use pipeline::{PageSize, PageView, Pipeline};
pub use selection::{Selection, SelectionState};
pub use session::{BrowserSession, SessionEvent, SessionSnapshot};
pub use traits::{ArchiveBuilder, RawFile, RawFolder, RawListing, StoreClient};
