//! Selection tracking
//!
//! Selection is a set of item keys scoped to one folder. Single-item changes
//! are unconditional; a key stays selected when a filter change hides it.
//! "Select all" works on the visible page only and replaces what was there.

use std::collections::HashSet;

use serde::Serialize;

use crate::item::NavigationItem;

/// Tri-state summary of the selection relative to the visible page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    None,
    Some,
    All,
}

/// Set of selected keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove a single key
    pub fn select(&mut self, key: impl Into<String>, included: bool) {
        let key = key.into();
        if included {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Select exactly the visible keys, or clear everything
    pub fn select_all_visible(&mut self, visible: &[NavigationItem], included: bool) {
        self.keys.clear();
        if included {
            self.keys
                .extend(visible.iter().map(|item| item.key().to_string()));
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn visible_selection_state(&self, visible: &[NavigationItem]) -> SelectionState {
        let selected = visible
            .iter()
            .filter(|item| self.is_selected(item.key()))
            .count();

        match selected {
            0 => SelectionState::None,
            n if n == visible.len() => SelectionState::All,
            _ => SelectionState::Some,
        }
    }

    /// Drop keys that are no longer present in `items`
    pub fn retain_present(&mut self, items: &[NavigationItem]) {
        let present: HashSet<&str> = items.iter().map(NavigationItem::key).collect();
        self.keys.retain(|key| present.contains(key.as_str()));
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selected keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
