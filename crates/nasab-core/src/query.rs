//! Query types for searching people

use crate::gender::Gender;
use serde::{Deserialize, Serialize};

/// Search mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring matching
    #[default]
    Exact,
    /// Fuzzy matching on names
    Fuzzy,
}

/// Pagination options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number (0-indexed)
    #[serde(default)]
    pub page: usize,

    /// Number of results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

impl Pagination {
    pub const MAX_PAGE_SIZE: usize = 1000;

    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Slice one page out of an already ordered result list
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect()
    }
}

/// Person search query builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonQuery {
    /// Text to search for; `None` matches everyone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Only return people of this gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(default)]
    pub mode: SearchMode,

    #[serde(default)]
    pub pagination: Pagination,
}

impl PersonQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Query with no text (filter-only)
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_pagination(mut self, page: usize, page_size: usize) -> Self {
        self.pagination = Pagination::new(page, page_size);
        self
    }

    /// Search text with surrounding whitespace removed, `None` if blank
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn matches_gender(&self, gender: Gender) -> bool {
        self.gender.map_or(true, |wanted| wanted == gender)
    }
}

/// Paginated search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResults<T> {
    /// The data for this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResults<T> {
    /// Paginate a complete, ordered result list
    pub fn from_all(all: Vec<T>, pagination: &Pagination) -> Self {
        let info = PaginationInfo::new(pagination.page, pagination.page_size, all.len());
        Self {
            data: pagination.apply(all),
            pagination: info,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationInfo {
    pub fn new(current_page: usize, page_size: usize, total_count: usize) -> Self {
        let total_pages = total_count.div_ceil(page_size.max(1));
        Self {
            current_page,
            page_size,
            total_count,
            total_pages,
            has_next_page: current_page + 1 < total_pages,
            has_previous_page: current_page > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_query_builder() {
        let query = PersonQuery::new("  aminah ")
            .with_mode(SearchMode::Fuzzy)
            .with_gender(Gender::Female)
            .with_pagination(1, 20);

        assert_eq!(query.trimmed_text(), Some("aminah"));
        assert_eq!(query.mode, SearchMode::Fuzzy);
        assert!(query.matches_gender(Gender::Female));
        assert!(!query.matches_gender(Gender::Male));
        assert_eq!(query.pagination.offset(), 20);
    }

    #[test]
    fn test_blank_text_matches_everyone() {
        assert_eq!(PersonQuery::new("   ").trimmed_text(), None);
        assert!(PersonQuery::all().matches_gender(Gender::Unknown));
    }

    #[test]
    fn test_pagination_caps_page_size() {
        assert_eq!(Pagination::new(0, 5000).page_size, 1000);
        assert_eq!(Pagination::new(0, 0).page_size, 1);
    }

    #[test]
    fn test_pagination_apply() {
        let pagination = Pagination::new(1, 2);
        assert_eq!(pagination.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);
    }

    #[test]
    fn test_paginated_results() {
        let results = PaginatedResults::from_all((0..35).collect(), &Pagination::new(1, 10));
        assert_eq!(results.data.len(), 10);
        assert_eq!(results.data[0], 10);
        assert_eq!(results.pagination.total_pages, 4);
        assert!(results.pagination.has_next_page);
        assert!(results.pagination.has_previous_page);
    }
}
