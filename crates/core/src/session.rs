//! Browsing session
//!
//! A [`BrowserSession`] owns the navigation state, the current folder's
//! items, the search/paging pipeline and the selection for one bucket, and
//! reports listing and export outcomes as [`SessionEvent`]s.
//!
//! Listing is split into [`BrowserSession::begin_listing`] and
//! [`BrowserSession::complete_listing`] so a caller can run the fetch
//! elsewhere; completions for anything but the latest navigation are dropped.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::bucket::BucketConfig;
use crate::error::{ExportError, ListingError, ListingErrorKind, Result};
use crate::export::{ExportOrchestrator, ExportOutcome};
use crate::item::NavigationItem;
use crate::listing::ListingEngine;
use crate::navigation::{ListingPhase, ListingTicket, NavigationState};
use crate::path::child_prefix;
use crate::pipeline::{PageSize, PageView, Pipeline};
use crate::selection::{Selection, SelectionState};
use crate::traits::{ArchiveBuilder, StoreClient};

/// Events emitted to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SessionEvent {
    ListingError {
        prefix: String,
        kind: ListingErrorKind,
        message: String,
        likely_misconfiguration: bool,
    },
    /// The connection must be treated as broken
    Disconnected,
    ExportStarted {
        item_count: usize,
    },
    ExportCompleted {
        byte_count: usize,
        item_count: usize,
    },
    ExportFailed {
        reason: String,
    },
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub bucket: String,
    pub current_prefix: String,
    pub breadcrumbs: Vec<String>,
    pub phase: ListingPhase,
    pub query: String,
    pub page: PageView,
    pub selected: Vec<String>,
    pub selection_state: SelectionState,
}

pub struct BrowserSession {
    bucket: BucketConfig,
    listing: ListingEngine,
    exporter: ExportOrchestrator,
    navigation: NavigationState,
    items: Vec<NavigationItem>,
    pipeline: Pipeline,
    selection: Selection,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl BrowserSession {
    /// Open a session rooted at the bucket's root folder
    ///
    /// Nothing is listed until [`BrowserSession::refresh`] is called.
    pub fn new(
        bucket: BucketConfig,
        store: Arc<dyn StoreClient>,
        builder: Arc<dyn ArchiveBuilder>,
        page_size: PageSize,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let root_prefix = bucket.root_prefix();
        tracing::debug!(bucket = %bucket.bucket, root_prefix, "opening session");

        let session = Self {
            listing: ListingEngine::new(store, bucket.bucket.clone()),
            exporter: ExportOrchestrator::new(builder, bucket.clone()),
            navigation: NavigationState::new(root_prefix),
            items: Vec::new(),
            pipeline: Pipeline::new(page_size),
            selection: Selection::new(),
            bucket,
            events,
        };
        (session, receiver)
    }

    pub fn bucket(&self) -> &BucketConfig {
        &self.bucket
    }

    pub fn current_prefix(&self) -> &str {
        self.navigation.current_prefix()
    }

    pub fn root_prefix(&self) -> &str {
        self.navigation.root_prefix()
    }

    pub fn breadcrumbs(&self) -> Vec<String> {
        self.navigation.breadcrumbs()
    }

    pub fn phase(&self) -> ListingPhase {
        self.navigation.phase()
    }

    pub fn is_disconnected(&self) -> bool {
        self.navigation.phase() == ListingPhase::Error
    }

    /// All items of the current folder, unfiltered
    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    pub fn query(&self) -> &str {
        self.pipeline.query()
    }

    pub fn page_size(&self) -> PageSize {
        self.pipeline.page_size()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The visible page; also stores the clamped page index
    pub fn page(&mut self) -> PageView {
        let prefix = self.navigation.current_prefix().to_string();
        self.pipeline.view(&self.items, &prefix)
    }

    pub fn snapshot(&mut self) -> SessionSnapshot {
        let page = self.page();
        SessionSnapshot {
            bucket: self.bucket.name.clone(),
            current_prefix: self.current_prefix().to_string(),
            breadcrumbs: self.breadcrumbs(),
            phase: self.phase(),
            query: self.query().to_string(),
            selected: self
                .selection
                .keys()
                .into_iter()
                .map(str::to_string)
                .collect(),
            selection_state: self.selection.visible_selection_state(&page.items),
            page,
        }
    }

    // ---- navigation ----

    /// Re-list the current folder, keeping selection and search
    pub async fn refresh(&mut self) -> Result<()> {
        let ticket = self.navigation.refresh()?;
        self.run_listing(ticket).await;
        Ok(())
    }

    /// Enter `full_prefix` and list it
    pub async fn enter_folder(&mut self, full_prefix: &str) -> Result<()> {
        let ticket = self.begin_navigation(|nav| nav.enter_folder(full_prefix))?;
        self.run_listing(ticket).await;
        Ok(())
    }

    /// Enter a folder given relative to the current one
    pub async fn enter_child(&mut self, path: &str) -> Result<()> {
        let target = child_prefix(self.navigation.current_prefix(), path)?;
        self.enter_folder(&target).await
    }

    pub async fn jump_to_breadcrumb(&mut self, index: usize) -> Result<()> {
        let ticket = self.begin_navigation(|nav| nav.jump_to_breadcrumb(index))?;
        self.run_listing(ticket).await;
        Ok(())
    }

    pub async fn go_up(&mut self) -> Result<()> {
        let ticket = self.begin_navigation(NavigationState::go_up)?;
        self.run_listing(ticket).await;
        Ok(())
    }

    /// Move to `full_prefix` without listing yet
    ///
    /// The caller fetches with the returned ticket and hands the result to
    /// [`BrowserSession::complete_listing`].
    pub fn begin_listing(&mut self, full_prefix: &str) -> Result<ListingTicket> {
        self.begin_navigation(|nav| nav.enter_folder(full_prefix))
    }

    /// Engine used to fetch a ticket started with [`BrowserSession::begin_listing`]
    pub fn listing_engine(&self) -> &ListingEngine {
        &self.listing
    }

    /// Apply a finished listing; returns false when it was superseded
    pub fn complete_listing(
        &mut self,
        ticket: &ListingTicket,
        result: std::result::Result<Vec<NavigationItem>, ListingError>,
    ) -> bool {
        match result {
            Ok(items) => {
                if !self.navigation.complete(ticket) {
                    tracing::debug!(
                        prefix = %ticket.prefix,
                        generation = ticket.generation,
                        "discarding stale listing"
                    );
                    return false;
                }
                self.items = items;
                self.pipeline.items_changed();
                self.selection.retain_present(&self.items);
                true
            }
            Err(err) => {
                if !self.navigation.fail(ticket) {
                    tracing::debug!(prefix = %ticket.prefix, "discarding stale listing error");
                    return false;
                }
                self.items.clear();
                self.emit(SessionEvent::ListingError {
                    prefix: ticket.prefix.clone(),
                    kind: err.kind,
                    message: err.user_message(),
                    likely_misconfiguration: err.likely_misconfiguration,
                });
                self.emit(SessionEvent::Disconnected);
                true
            }
        }
    }

    fn begin_navigation(
        &mut self,
        transition: impl FnOnce(&mut NavigationState) -> Result<ListingTicket>,
    ) -> Result<ListingTicket> {
        let ticket = transition(&mut self.navigation)?;
        // the previous folder's items must not be paged or selected meanwhile
        self.items.clear();
        self.selection.clear();
        self.pipeline.reset();
        tracing::debug!(prefix = %ticket.prefix, generation = ticket.generation, "navigated");
        Ok(ticket)
    }

    async fn run_listing(&mut self, ticket: ListingTicket) {
        let result = self.listing.list(&ticket.prefix).await;
        self.complete_listing(&ticket, result);
    }

    // ---- search and paging ----

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.pipeline.set_query(query);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pipeline.set_page_size(page_size);
    }

    pub fn set_page(&mut self, page_index: usize) -> PageView {
        self.pipeline.set_page(page_index);
        self.page()
    }

    pub fn next_page(&mut self) -> PageView {
        let current = self.page().page_index;
        self.set_page(current + 1)
    }

    pub fn prev_page(&mut self) -> PageView {
        let current = self.page().page_index;
        self.set_page(current.saturating_sub(1))
    }

    // ---- selection ----

    pub fn select(&mut self, key: impl Into<String>, included: bool) {
        self.selection.select(key, included);
    }

    pub fn select_all_visible(&mut self, included: bool) {
        let page = self.page();
        self.selection.select_all_visible(&page.items, included);
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.is_selected(key)
    }

    pub fn visible_selection_state(&mut self) -> SelectionState {
        let page = self.page();
        self.selection.visible_selection_state(&page.items)
    }

    // ---- export ----

    /// Export the selection as one archive
    pub async fn export_selection(&self) -> std::result::Result<ExportOutcome, ExportError> {
        let entries = crate::export::build_request(&self.selection, &self.items);
        if entries.is_empty() {
            let err = ExportError::EmptySelection;
            self.emit(SessionEvent::ExportFailed {
                reason: err.reason(),
            });
            return Err(err);
        }
        self.emit(SessionEvent::ExportStarted {
            item_count: entries.len(),
        });

        let result = self
            .exporter
            .export_selection(&self.selection, &self.items, self.current_prefix())
            .await;

        match &result {
            Ok(outcome) => self.emit(SessionEvent::ExportCompleted {
                byte_count: outcome.byte_count(),
                item_count: outcome.item_count,
            }),
            Err(err) => self.emit(SessionEvent::ExportFailed {
                reason: err.reason(),
            }),
        }
        result
    }

    fn emit(&self, event: SessionEvent) {
        // a dropped receiver only means nobody is rendering
        let _ = self.events.send(event);
    }
}
