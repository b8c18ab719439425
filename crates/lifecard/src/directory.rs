//! Directory view over a user's own records.
//!
//! Fetches one page at a time from the store and applies a client-side
//! substring filter over name, city, and emergency-contact name on the
//! currently loaded page only. While a search term is active, pagination
//! is disabled: searching never requests additional pages. That is a
//! deliberate simplification carried over from the product, not a bug.

use crate::error::Result;
use crate::person::Person;
use crate::store::{Page, PersonStore};

/// Default number of records shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Paginated, filterable view of one owner's records.
#[derive(Debug)]
pub struct Directory {
    page: Page<Person>,
    page_size: usize,
    search: Option<String>,
}

impl Directory {
    /// Create an empty directory view with the given page size.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page: Page {
                items: Vec::new(),
                total_count: 0,
                page: 1,
                page_size,
            },
            page_size,
            search: None,
        }
    }

    /// Load one page of the owner's records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn load(&mut self, store: &PersonStore, owner_id: &str, page: usize) -> Result<()> {
        self.page = store.list(owner_id, page, self.page_size)?;
        Ok(())
    }

    /// Reload the current page (after a create, update, or delete).
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn refresh(&mut self, store: &PersonStore, owner_id: &str) -> Result<()> {
        self.load(store, owner_id, self.page.page)
    }

    /// Set the search term. Empty or whitespace-only terms clear it.
    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        };
    }

    /// Clear the search term, re-enabling pagination.
    pub fn clear_search(&mut self) {
        self.search = None;
    }

    /// The active search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// The records visible on the current page, after filtering.
    ///
    /// The filter is a case-insensitive substring match over name,
    /// address city, and emergency-contact name, applied to the loaded
    /// page only.
    #[must_use]
    pub fn visible(&self) -> Vec<&Person> {
        match &self.search {
            None => self.page.items.iter().collect(),
            Some(term) => self
                .page
                .items
                .iter()
                .filter(|p| {
                    p.name.to_lowercase().contains(term)
                        || p.address.city.to_lowercase().contains(term)
                        || p.emergency_contact.name.to_lowercase().contains(term)
                })
                .collect(),
        }
    }

    /// The current 1-based page number.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page.page
    }

    /// Total records for the owner across all pages.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.page.total_count
    }

    /// Number of pages for the owner's records.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.page.total_pages()
    }

    /// Whether pagination controls are enabled.
    ///
    /// Always false while a search is active: search implies
    /// current-page-only semantics.
    #[must_use]
    pub fn can_paginate(&self) -> bool {
        self.search.is_none()
    }

    /// Whether a next page exists (and pagination is enabled).
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.can_paginate() && self.page.page < self.total_pages()
    }

    /// Whether a previous page exists (and pagination is enabled).
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.can_paginate() && self.page.page > 1
    }

    /// Load the next page. A no-op while searching or on the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn next_page(&mut self, store: &PersonStore, owner_id: &str) -> Result<()> {
        if self.has_next() {
            self.load(store, owner_id, self.page.page + 1)?;
        }
        Ok(())
    }

    /// Load the previous page. A no-op while searching or on the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn prev_page(&mut self, store: &PersonStore, owner_id: &str) -> Result<()> {
        if self.has_prev() {
            self.load(store, owner_id, self.page.page - 1)?;
        }
        Ok(())
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
