//! Navigation state machine
//!
//! Tracks the current prefix inside a fixed root prefix and the phase of the
//! folder listing that every move triggers. Each move into `Listing` bumps a
//! generation counter; a completed listing is accepted only when it carries
//! the current generation, so the last navigation wins.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::{breadcrumb_parts, breadcrumb_prefix};

/// Phase of the folder listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingPhase {
    Idle,
    Listing,
    Ready,
    /// Terminal for the session; the owner must reconnect
    Error,
}

/// Handle for one in-flight listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    pub generation: u64,
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub struct NavigationState {
    root_prefix: String,
    current_prefix: String,
    phase: ListingPhase,
    generation: u64,
}

impl NavigationState {
    /// Start at `root_prefix`, which must already be normalized
    pub fn new(root_prefix: impl Into<String>) -> Self {
        let root_prefix = root_prefix.into();
        Self {
            current_prefix: root_prefix.clone(),
            root_prefix,
            phase: ListingPhase::Idle,
            generation: 0,
        }
    }

    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    pub fn current_prefix(&self) -> &str {
        &self.current_prefix
    }

    pub fn phase(&self) -> ListingPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn breadcrumbs(&self) -> Vec<String> {
        breadcrumb_parts(&self.root_prefix, &self.current_prefix)
    }

    /// Whether the current prefix is the root prefix
    pub fn at_root(&self) -> bool {
        self.current_prefix == self.root_prefix
    }

    /// Move to `full_prefix` and start listing it
    ///
    /// Rejected, leaving state untouched, when the prefix lies outside the
    /// root or does not name a folder.
    pub fn enter_folder(&mut self, full_prefix: &str) -> Result<ListingTicket> {
        self.ensure_connected()?;
        if !full_prefix.starts_with(&self.root_prefix) {
            return Err(Error::InvalidPath(format!(
                "'{full_prefix}' is outside the root folder '{}'",
                self.root_prefix
            )));
        }
        if !full_prefix.is_empty() && !full_prefix.ends_with('/') {
            return Err(Error::InvalidPath(format!(
                "'{full_prefix}' is not a folder prefix"
            )));
        }

        self.current_prefix = full_prefix.to_string();
        Ok(self.begin_listing())
    }

    /// Move to breadcrumb `index`; 0 is the root
    pub fn jump_to_breadcrumb(&mut self, index: usize) -> Result<ListingTicket> {
        let target = breadcrumb_prefix(&self.root_prefix, &self.breadcrumbs(), index)?;
        self.enter_folder(&target)
    }

    /// Move one level up
    pub fn go_up(&mut self) -> Result<ListingTicket> {
        let crumbs = self.breadcrumbs();
        if crumbs.len() <= 1 {
            return Err(Error::InvalidPath("already at the root folder".into()));
        }
        self.jump_to_breadcrumb(crumbs.len() - 2)
    }

    /// Re-list the current prefix without moving
    pub fn refresh(&mut self) -> Result<ListingTicket> {
        self.ensure_connected()?;
        Ok(self.begin_listing())
    }

    /// Whether a completed listing should be applied
    pub fn is_current(&self, ticket: &ListingTicket) -> bool {
        self.phase == ListingPhase::Listing
            && ticket.generation == self.generation
            && ticket.prefix == self.current_prefix
    }

    /// Record a successful listing; false when the ticket is stale
    pub fn complete(&mut self, ticket: &ListingTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = ListingPhase::Ready;
        true
    }

    /// Record a failed listing; false when the ticket is stale
    pub fn fail(&mut self, ticket: &ListingTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = ListingPhase::Error;
        true
    }

    fn begin_listing(&mut self) -> ListingTicket {
        self.generation += 1;
        self.phase = ListingPhase::Listing;
        ListingTicket {
            generation: self.generation,
            prefix: self.current_prefix.clone(),
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.phase == ListingPhase::Error {
            return Err(Error::General(
                "session is disconnected; reconfigure the bucket and start a new session".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let nav = NavigationState::new("docs/");
        assert_eq!(nav.current_prefix(), "docs/");
        assert_eq!(nav.phase(), ListingPhase::Idle);
        assert_eq!(nav.breadcrumbs(), vec!["home"]);
        assert!(nav.at_root());
    }

    #[test]
    fn test_enter_folder_inside_root() {
        let mut nav = NavigationState::new("docs/");
        let ticket = nav.enter_folder("docs/img/").unwrap();
        assert_eq!(ticket.prefix, "docs/img/");
        assert_eq!(nav.phase(), ListingPhase::Listing);
        assert_eq!(nav.breadcrumbs(), vec!["home", "img"]);
    }

    #[test]
    fn test_enter_folder_outside_root_rejected() {
        let mut nav = NavigationState::new("docs/");
        assert!(nav.enter_folder("other/").is_err());
        assert!(nav.enter_folder("").is_err());
        // string prefix, not path prefix: "docs/" is not a prefix of "docsx/"
        assert!(nav.enter_folder("docsx/").is_err());
        assert_eq!(nav.current_prefix(), "docs/");
        assert_eq!(nav.phase(), ListingPhase::Idle);
    }

    #[test]
    fn test_enter_folder_needs_trailing_slash() {
        let mut nav = NavigationState::new("");
        assert!(nav.enter_folder("docs").is_err());
        assert!(nav.enter_folder("docs/").is_ok());
        assert!(nav.enter_folder("").is_ok());
    }

    #[test]
    fn test_prefix_stays_under_root() {
        let mut nav = NavigationState::new("r/");
        for target in ["r/a/", "x/", "r/a/b/", "", "r/", "r/c/d/e/", "rr/"] {
            let _ = nav.enter_folder(target);
            assert!(nav.current_prefix().starts_with(nav.root_prefix()));
        }
    }

    #[test]
    fn test_jump_to_breadcrumb() {
        let mut nav = NavigationState::new("docs/");
        nav.enter_folder("docs/a/b/c/").unwrap();

        let ticket = nav.jump_to_breadcrumb(2).unwrap();
        assert_eq!(ticket.prefix, "docs/a/b/");

        nav.jump_to_breadcrumb(0).unwrap();
        assert_eq!(nav.current_prefix(), "docs/");

        assert!(nav.jump_to_breadcrumb(5).is_err());
    }

    #[test]
    fn test_go_up() {
        let mut nav = NavigationState::new("");
        nav.enter_folder("a/b/").unwrap();
        nav.go_up().unwrap();
        assert_eq!(nav.current_prefix(), "a/");
        nav.go_up().unwrap();
        assert_eq!(nav.current_prefix(), "");
        assert!(nav.go_up().is_err());
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut nav = NavigationState::new("");
        let first = nav.enter_folder("a/").unwrap();
        let second = nav.enter_folder("b/").unwrap();

        assert!(!nav.complete(&first));
        assert_eq!(nav.phase(), ListingPhase::Listing);
        assert!(nav.complete(&second));
        assert_eq!(nav.phase(), ListingPhase::Ready);
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut nav = NavigationState::new("");
        let first = nav.refresh().unwrap();
        let second = nav.refresh().unwrap();
        assert!(!nav.fail(&first));
        assert!(nav.complete(&second));
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut nav = NavigationState::new("");
        let ticket = nav.refresh().unwrap();
        assert!(nav.fail(&ticket));
        assert_eq!(nav.phase(), ListingPhase::Error);
        assert!(nav.enter_folder("a/").is_err());
        assert!(nav.refresh().is_err());
    }
}
