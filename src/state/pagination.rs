//! Pagination and filter bookkeeping for the route list.

use crate::model::{ListQuery, RoutePage};

/// Page sizes offered to the user.
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

/// Pagination and filter state of the route list.
///
/// Setters never fetch; they return `true` when the caller must reload.
/// `current_page` stays within `[1, max(total_pages, 1)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    current_page: u32,
    items_per_page: u32,
    total_routes: u64,
    total_pages: u32,
    active_only: bool,
    search_term: String,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(PAGE_SIZES[0])
    }
}

impl PageState {
    /// Fresh state on page 1 with nothing loaded yet.
    pub fn new(items_per_page: u32) -> Self {
        let items_per_page = if PAGE_SIZES.contains(&items_per_page) {
            items_per_page
        } else {
            PAGE_SIZES[0]
        };
        Self {
            current_page: 1,
            items_per_page,
            total_routes: 0,
            total_pages: 0,
            active_only: false,
            search_term: String::new(),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn total_routes(&self) -> u64 {
        self.total_routes
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn active_only(&self) -> bool {
        self.active_only
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Jump to page `n`. Out-of-range or unchanged pages are ignored.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.total_pages || n == self.current_page {
            return false;
        }
        self.current_page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Change the page size. Unsupported sizes are ignored; accepted sizes
    /// restart from page 1.
    pub fn set_items_per_page(&mut self, n: u32) -> bool {
        if !PAGE_SIZES.contains(&n) || n == self.items_per_page {
            return false;
        }
        self.items_per_page = n;
        self.current_page = 1;
        true
    }

    /// Toggle the active-only filter, restarting from page 1 on change.
    pub fn set_active_only(&mut self, active_only: bool) -> bool {
        if active_only == self.active_only {
            return false;
        }
        self.active_only = active_only;
        self.current_page = 1;
        true
    }

    /// Set the search term, restarting from page 1 on change.
    pub fn set_search_term(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term == self.search_term {
            return false;
        }
        self.search_term = term.to_string();
        self.current_page = 1;
        true
    }

    /// Return to page 1 without touching filters.
    pub fn reset_to_first(&mut self) {
        self.current_page = 1;
    }

    /// Query for the current page and filters.
    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.current_page,
            per_page: self.items_per_page,
            active_only: self.active_only,
            search: (!self.search_term.is_empty()).then(|| self.search_term.clone()),
        }
    }

    /// Overwrite totals from a listing response and clamp the current page.
    ///
    /// Returns `true` when the current page fell outside the new range and was
    /// moved; the page the caller holds is then not the one it asked for.
    pub fn apply_page(&mut self, page: &RoutePage) -> bool {
        self.total_routes = page.total;
        self.total_pages = page.pages;
        let last = self.total_pages.max(1);
        let clamped = self.current_page.clamp(1, last);
        let moved = clamped != self.current_page;
        self.current_page = clamped;
        moved
    }
}
