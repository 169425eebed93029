//! Derived views: search, filter, sort and pagination state, plus the pure
//! function that applies that state to a collection held in memory.
//!
//! Backend lists are filtered server-side: [`ViewState`] is turned into query
//! parameters and the server returns one page. [`derive_view`] is for collections
//! the client already holds in full, such as the payments of one member.

use crate::models::Pagination;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// Value used for the `sortOrder` query parameter
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    /// Column (field) name
    pub column: String,
    /// Direction
    pub direction: SortDirection,
}

/// Local UI state that determines what part of a collection is displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search: String,
    filters: BTreeMap<String, String>,
    sort: Option<SortState>,
    page: u32,
    page_size: u32,
}

impl ViewState {
    /// Fresh state on page 1 with no search, filters or sort.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Current search text, already trimmed
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Active filters by field name
    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Active sort, if any
    #[must_use]
    pub const fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Current page (1-based)
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Records per page
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Sets the search text. Returns true, and goes back to page 1, if it changed.
    pub fn set_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text == self.search {
            return false;
        }
        self.search = text.to_string();
        self.page = 1;
        true
    }

    /// Sets or clears (`None` or empty) one filter.
    ///
    /// Returns true, and goes back to page 1, if it changed.
    pub fn set_filter(&mut self, field: &str, value: Option<&str>) -> bool {
        let changed = match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                self.filters
                    .insert(field.to_string(), value.to_string())
                    .as_deref()
                    != Some(value)
            }
            None => self.filters.remove(field).is_some(),
        };
        if changed {
            self.page = 1;
        }
        changed
    }

    /// Removes every filter and goes back to page 1.
    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.filters.clear();
            self.page = 1;
        }
    }

    /// Changes the page size and goes back to page 1.
    pub fn set_page_size(&mut self, page_size: u32) {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    /// Moves to `page`, clamped to `1..=max(1, total_pages)`.
    pub fn set_page(&mut self, page: u32, total_pages: u32) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    /// Header click on `column`: the same column flips direction, a new column starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = Some(match self.sort.take() {
            Some(current) if current.column == column => SortState {
                direction: current.direction.flipped(),
                ..current
            },
            _ => SortState {
                column: column.to_string(),
                direction: SortDirection::default(),
            },
        });
    }

    /// Drops the active sort.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }
}

/// A comparable value extracted from a record for sorting
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Compared case-insensitively
    Text(String),
    /// Compared numerically
    Number(f64),
    /// Compared chronologically
    Date(NaiveDate),
    /// `false` before `true`
    Bool(bool),
    /// Missing value, always sorted last
    Missing,
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Greater,
            (_, Self::Missing) => Ordering::Less,
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    /// Orders two values in `direction`. Missing values stay last either way.
    fn compare_directed(&self, other: &Self, direction: SortDirection) -> Ordering {
        let ordering = self.compare(other);
        match (self, other, direction) {
            (Self::Missing, _, _) | (_, Self::Missing, _) | (_, _, SortDirection::Asc) => ordering,
            (_, _, SortDirection::Desc) => ordering.reverse(),
        }
    }
}

/// A record that can be searched, filtered and sorted in memory
pub trait ViewRecord {
    /// String fields the search text is matched against
    fn search_fields(&self) -> Vec<&str>;

    /// Value of `field` for filter matching, `None` if the record has no such field
    fn filter_value(&self, field: &str) -> Option<String>;

    /// Value of `column` for sorting
    fn sort_value(&self, column: &str) -> SortValue;
}

/// The displayed slice of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPage<T> {
    /// Records on the current page, in display order
    pub items: Vec<T>,
    /// Page metadata for the filtered collection
    pub pagination: Pagination,
}

fn matches_search<T: ViewRecord>(record: &T, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

fn matches_filters<T: ViewRecord>(record: &T, filters: &BTreeMap<String, String>) -> bool {
    filters.iter().all(|(field, wanted)| {
        record
            .filter_value(field)
            .is_some_and(|actual| actual.eq_ignore_ascii_case(wanted))
    })
}

/// Filters records by search text and filters only, keeping source order.
pub fn filter_records<'a, T: ViewRecord>(items: &'a [T], state: &ViewState) -> Vec<&'a T> {
    let needle = state.search.to_lowercase();
    items
        .iter()
        .filter(|record| matches_search(*record, &needle))
        .filter(|record| matches_filters(*record, &state.filters))
        .collect()
}

/// Applies search, filters, sort and pagination to `items`.
///
/// The sort is stable, so ties keep their source order. The page is clamped
/// into range, so a stale page number past the end shows the last page.
pub fn derive_view<T: ViewRecord + Clone>(items: &[T], state: &ViewState) -> DerivedPage<T> {
    let mut matched = filter_records(items, state);

    if let Some(sort) = &state.sort {
        matched.sort_by(|a, b| {
            a.sort_value(&sort.column)
                .compare_directed(&b.sort_value(&sort.column), sort.direction)
        });
    }

    let total = matched.len() as u64;
    let mut pagination = Pagination::new(state.page, state.page_size, total);
    pagination.page = state.page.clamp(1, pagination.total_pages.max(1));

    let size = state.page_size as usize;
    let start = (pagination.page as usize - 1) * size;
    let items = matched
        .into_iter()
        .skip(start)
        .take(size)
        .cloned()
        .collect();

    DerivedPage { items, pagination }
}
