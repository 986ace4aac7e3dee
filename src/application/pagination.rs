//! Offset pagination: the list query, the returned page and the page window.

use std::{collections::BTreeMap, num::NonZeroU32};

use serde::Serialize;

use crate::application::listing::sort::SortState;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Filter name used for the free-text search box.
pub const SEARCH_FILTER: &str = "q";

const PAGE_WINDOW_FULL: u32 = 7;
const PAGE_WINDOW_EDGE: u32 = 4;

/// Canonical description of which page of which filtered, sorted rows to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: NonZeroU32,
    page_size: NonZeroU32,
    sort: SortState,
    filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(NonZeroU32::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroU32::MIN))
    }
}

impl ListQuery {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page: NonZeroU32::MIN,
            page_size,
            sort: SortState::default(),
            filters: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn sort_mut(&mut self) -> &mut SortState {
        &mut self.sort
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// Page numbers below one are treated as the first page.
    pub fn set_page(&mut self, page: u32) {
        self.page = NonZeroU32::new(page).unwrap_or(NonZeroU32::MIN);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = NonZeroU32::new(page_size).unwrap_or(NonZeroU32::MIN);
    }

    /// Set or clear a filter. Blank values clear it. Returns whether the
    /// filter set changed.
    pub fn set_filter(&mut self, name: &str, value: Option<&str>) -> bool {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => {
                let previous = self.filters.insert(name.to_string(), value.to_string());
                previous.as_deref() != Some(value)
            }
            None => self.filters.remove(name).is_some(),
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let (Some(key), Some(direction)) = (self.sort.key(), self.sort.direction()) {
            pairs.push(("sortKey".to_string(), key.to_string()));
            pairs.push(("sortDir".to_string(), direction.as_str().to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        pairs
    }
}

/// One page of rows plus the count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}

/// Number of pages needed for `total` rows; never less than one.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

/// Compact pager: the first and last page are always shown, with at most
/// five interior numbers and two ellipses.
pub fn page_window(current: u32, total: u32) -> Vec<PageMarker> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    if total <= PAGE_WINDOW_FULL {
        return (1..=total).map(PageMarker::Page).collect();
    }

    let mut markers = Vec::with_capacity(PAGE_WINDOW_FULL as usize);
    if current <= PAGE_WINDOW_EDGE {
        markers.extend((1..=5).map(PageMarker::Page));
        markers.push(PageMarker::Ellipsis);
        markers.push(PageMarker::Page(total));
    } else if current >= total - 3 {
        markers.push(PageMarker::Page(1));
        markers.push(PageMarker::Ellipsis);
        markers.extend((total - 4..=total).map(PageMarker::Page));
    } else {
        markers.push(PageMarker::Page(1));
        markers.push(PageMarker::Ellipsis);
        markers.extend((current - 1..=current + 1).map(PageMarker::Page));
        markers.push(PageMarker::Ellipsis);
        markers.push(PageMarker::Page(total));
    }
    markers
}
