//! Filter and pagination state for the admin review list.
//!
//! [`FilterState`] owns the current [`FilterQuery`]. Every mutation except
//! paging sends the list back to the first page. The page count is only known
//! once a result for the current filter has been observed; until then any
//! positive page is accepted.

use serde::Serialize;

use crate::model::{MAX_RATING, MIN_RATING};

/// Page sizes offered by the list view.
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

pub const DEFAULT_LIMIT: u32 = 25;

/// Rating filter options in display order (`None` = all ratings).
pub const RATING_OPTIONS: [Option<u8>; 6] = [None, Some(5), Some(4), Some(3), Some(2), Some(1)];

/// Parameters of one admin list request. Also the cache key for the list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterQuery {
    pub rating: Option<u8>,
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for FilterQuery {
    fn default() -> Self {
        Self {
            rating: None,
            search: String::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl FilterQuery {
    /// Whether any narrowing filter is active.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.rating.is_some() || !self.search.is_empty()
    }

    /// 1-based page index derived from offset.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.offset / self.limit + 1
    }
}

/// Pagination numbers for a known result total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
    pub total: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(query: &FilterQuery, total: u64) -> Self {
        Self {
            offset: query.offset,
            limit: query.limit,
            total,
        }
    }

    /// ceil(total / limit).
    #[must_use]
    pub fn page_count(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.offset / self.limit + 1
    }

    /// First displayed row, 1-based; 0 when nothing matches.
    #[must_use]
    pub fn first_row(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            u64::from(self.offset) + 1
        }
    }

    #[must_use]
    pub fn last_row(&self) -> u64 {
        (u64::from(self.offset) + u64::from(self.limit)).min(self.total)
    }

    /// "Showing 26 to 47 of 47"
    #[must_use]
    pub fn showing_label(&self) -> String {
        format!(
            "Showing {} to {} of {}",
            self.first_row(),
            self.last_row(),
            self.total
        )
    }

    /// "Page 2 of 2"; an empty result still reads as one page.
    #[must_use]
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current_page(), self.page_count().max(1))
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.offset > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page() < self.page_count()
    }
}

/// Owner of the current list query.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    query: FilterQuery,
    /// Total from the last result for the current filter.
    total: Option<u64>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn query(&self) -> &FilterQuery {
        &self.query
    }

    /// Set the rating filter. Ratings outside 1-5 are rejected.
    pub fn set_rating(&mut self, rating: Option<u8>) -> bool {
        if let Some(r) = rating {
            if !(MIN_RATING..=MAX_RATING).contains(&r) {
                return false;
            }
        }
        self.query.rating = rating;
        self.reset_paging();
        true
    }

    /// Apply committed search text (after debouncing).
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.reset_paging();
    }

    /// Set the page size. Only values from [`PAGE_SIZES`] are accepted.
    pub fn set_limit(&mut self, limit: u32) -> bool {
        if !PAGE_SIZES.contains(&limit) {
            return false;
        }
        self.query.limit = limit;
        self.reset_paging();
        true
    }

    /// Jump to a 1-based page.
    ///
    /// Returns `false` (and changes nothing) for page 0 or a page past the
    /// known page count.
    pub fn set_page(&mut self, page: u32) -> bool {
        if page == 0 {
            return false;
        }
        if let Some(count) = self.page_count() {
            if page > count.max(1) {
                return false;
            }
        }
        let Some(offset) = (page - 1).checked_mul(self.query.limit) else {
            return false;
        };
        self.query.offset = offset;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.query.current_page() + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.query.current_page() {
            1 => false,
            page => self.set_page(page - 1),
        }
    }

    /// Step through [`RATING_OPTIONS`].
    pub fn cycle_rating(&mut self) {
        let idx = RATING_OPTIONS
            .iter()
            .position(|r| *r == self.query.rating)
            .unwrap_or(0);
        let next = RATING_OPTIONS[(idx + 1) % RATING_OPTIONS.len()];
        self.set_rating(next);
    }

    /// Step through [`PAGE_SIZES`].
    pub fn cycle_limit(&mut self) {
        let idx = PAGE_SIZES
            .iter()
            .position(|l| *l == self.query.limit)
            .unwrap_or(0);
        let next = PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()];
        self.set_limit(next);
    }

    /// Drop rating and search filters, keeping the page size.
    pub fn clear_filters(&mut self) {
        self.query.rating = None;
        self.query.search.clear();
        self.reset_paging();
    }

    /// Record the total of a result received for the current query.
    pub fn observe_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    #[must_use]
    pub fn page_count(&self) -> Option<u32> {
        self.pagination().map(|p| p.page_count())
    }

    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.total.map(|total| Pagination::new(&self.query, total))
    }

    fn reset_paging(&mut self) {
        self.query.offset = 0;
        // The old total described a different filter.
        self.total = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let state = FilterState::new();
        let q = state.query();
        assert_eq!(q.rating, None);
        assert_eq!(q.search, "");
        assert_eq!(q.limit, 25);
        assert_eq!(q.offset, 0);
        assert!(state.page_count().is_none());
    }

    #[test]
    fn test_pagination_arithmetic() {
        let mut state = FilterState::new();
        state.observe_total(47);
        assert_eq!(state.page_count(), Some(2));

        assert!(state.set_page(2));
        assert_eq!(state.query().offset, 25);

        let p = state.pagination().unwrap();
        assert_eq!(p.showing_label(), "Showing 26 to 47 of 47");
        assert_eq!(p.page_label(), "Page 2 of 2");
        assert!(p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn test_set_page_rejects_out_of_range_once_known() {
        let mut state = FilterState::new();
        state.observe_total(47);

        assert!(!state.set_page(3));
        assert!(!state.set_page(0));
        assert_eq!(state.query().offset, 0);
    }

    #[test]
    fn test_set_page_optimistic_while_unknown() {
        let mut state = FilterState::new();
        assert!(state.set_page(7));
        assert_eq!(state.query().offset, 150);
    }

    #[test]
    fn test_empty_result_is_single_page() {
        let mut state = FilterState::new();
        state.observe_total(0);
        let p = state.pagination().unwrap();
        assert_eq!(p.page_count(), 0);
        assert_eq!(p.page_label(), "Page 1 of 1");
        assert_eq!(p.showing_label(), "Showing 0 to 0 of 0");
        assert!(state.set_page(1));
        assert!(!state.set_page(2));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut state = FilterState::new();
        assert!(!state.set_rating(Some(6)));
        assert!(!state.set_rating(Some(0)));
        assert!(!state.set_limit(30));
        assert_eq!(state.query(), &FilterQuery::default());
    }

    #[test]
    fn test_cycle_rating_and_limit() {
        let mut state = FilterState::new();
        state.cycle_rating();
        assert_eq!(state.query().rating, Some(5));
        for _ in 0..5 {
            state.cycle_rating();
        }
        assert_eq!(state.query().rating, None);

        state.cycle_limit();
        assert_eq!(state.query().limit, 50);
        state.cycle_limit();
        state.cycle_limit();
        assert_eq!(state.query().limit, 10);
    }

    #[test]
    fn test_next_previous_page() {
        let mut state = FilterState::new();
        state.observe_total(60);
        assert!(!state.previous_page());
        assert!(state.next_page());
        assert!(state.next_page());
        assert!(!state.next_page());
        assert_eq!(state.query().current_page(), 3);
        assert!(state.previous_page());
        assert_eq!(state.query().offset, 25);
    }

    #[derive(Debug, Clone)]
    enum Mutation {
        Rating(Option<u8>),
        Search(String),
        Limit(u32),
        Page(u32),
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            proptest::option::of(1u8..=5).prop_map(Mutation::Rating),
            "[a-z ]{0,12}".prop_map(Mutation::Search),
            proptest::sample::select(PAGE_SIZES.to_vec()).prop_map(Mutation::Limit),
            (1u32..10).prop_map(Mutation::Page),
        ]
    }

    proptest! {
        #[test]
        fn prop_filter_changes_reset_offset(
            mutations in proptest::collection::vec(mutation(), 1..30),
            total in 0u64..500,
        ) {
            let mut state = FilterState::new();
            for m in mutations {
                state.observe_total(total);
                match m {
                    Mutation::Rating(r) => {
                        state.set_rating(r);
                        prop_assert_eq!(state.query().offset, 0);
                    }
                    Mutation::Search(s) => {
                        state.set_search(s);
                        prop_assert_eq!(state.query().offset, 0);
                    }
                    Mutation::Limit(l) => {
                        state.set_limit(l);
                        prop_assert_eq!(state.query().offset, 0);
                    }
                    Mutation::Page(p) => {
                        state.set_page(p);
                    }
                }
                prop_assert_eq!(state.query().offset % state.query().limit, 0);
            }
        }
    }
}
