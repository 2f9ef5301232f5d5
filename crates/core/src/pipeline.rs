//! Filter and pagination pipeline
//!
//! [`apply`] is a pure function from (items, query, page size, page index) to
//! the visible page. [`Pipeline`] keeps the query, page size and page index
//! for a session and resets the page whenever the input changes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::item::NavigationItem;

/// Allowed page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Ten,
    #[default]
    TwentyFive,
    Fifty,
    OneHundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::OneHundred,
    ];

    pub const fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::OneHundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            10 => Ok(PageSize::Ten),
            25 => Ok(PageSize::TwentyFive),
            50 => Ok(PageSize::Fifty),
            100 => Ok(PageSize::OneHundred),
            other => Err(Error::Config(format!(
                "page size must be one of 10, 25, 50, 100 (got {other})"
            ))),
        }
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get() as u32
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl std::str::FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid page size: {s}")))?;
        PageSize::try_from(value)
    }
}

/// One page of filtered items plus its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub items: Vec<NavigationItem>,
    /// 1-based, always within `1..=total_pages`
    pub page_index: usize,
    /// Never less than 1
    pub total_pages: usize,
    /// Number of items surviving the filter
    pub total_items: usize,
    pub page_size: usize,
}

impl PageView {
    /// Keys on this page, in display order
    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(NavigationItem::key).collect()
    }
}

/// Case-insensitive substring match on the display name
pub fn matches_query(item: &NavigationItem, query: &str, current_prefix: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    item.display_name(current_prefix)
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Filter `items` by `query` and cut out page `page_index`
///
/// The page index is clamped into `1..=total_pages`, so any input yields a
/// valid page.
pub fn apply(
    items: &[NavigationItem],
    query: &str,
    page_size: PageSize,
    page_index: usize,
    current_prefix: &str,
) -> PageView {
    let filtered: Vec<&NavigationItem> = items
        .iter()
        .filter(|item| matches_query(item, query, current_prefix))
        .collect();

    let size = page_size.get();
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(size).max(1);
    let page_index = page_index.clamp(1, total_pages);

    let start = (page_index - 1) * size;
    let items = filtered
        .into_iter()
        .skip(start)
        .take(size)
        .cloned()
        .collect();

    PageView {
        items,
        page_index,
        total_pages,
        total_items,
        page_size: size,
    }
}

/// Search and paging state of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    query: String,
    page_size: PageSize,
    page_index: usize,
}

impl Pipeline {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            query: String::new(),
            page_size,
            page_index: 1,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index.max(1)
    }

    /// Change the search query; returns to page 1 when it differs
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.page_index = 1;
        }
    }

    /// Change the page size; returns to page 1 when it differs
    pub fn set_page_size(&mut self, page_size: PageSize) {
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page_index = 1;
        }
    }

    /// Jump to a page; out-of-range values are clamped at [`Pipeline::view`] time
    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    /// Call whenever the raw item list is replaced
    pub fn items_changed(&mut self) {
        self.page_index = 1;
    }

    /// Clear the query and return to page 1; page size is kept
    pub fn reset(&mut self) {
        self.query.clear();
        self.page_index = 1;
    }

    /// Compute the visible page and store the clamped index
    pub fn view(&mut self, items: &[NavigationItem], current_prefix: &str) -> PageView {
        let view = apply(
            items,
            &self.query,
            self.page_size,
            self.page_index(),
            current_prefix,
        );
        self.page_index = view.page_index;
        view
    }
}
