//! Search engine traits

use async_trait::async_trait;
use nasab_core::{PaginatedResults, Person, PersonQuery, SearchMode};
use serde::Serialize;

pub use crate::error::{SearchError, SearchResult as Result};

/// Result from search including score
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub person: Person,
    pub score: u32,
}

/// Trait for search engines
///
/// Engines are stateless: every call receives the people to search.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Every matching person, best match first, before pagination
    async fn rank(&self, query: &PersonQuery, people: &[Person]) -> Result<Vec<SearchHit>>;

    /// One page of matching people
    async fn search(&self, query: &PersonQuery, people: &[Person]) -> Result<Vec<Person>> {
        let hits = self.rank(query, people).await?;
        Ok(query
            .pagination
            .apply(hits)
            .into_iter()
            .map(|hit| hit.person)
            .collect())
    }

    /// One page of matching people with pagination metadata
    async fn search_page(
        &self,
        query: &PersonQuery,
        people: &[Person],
    ) -> Result<PaginatedResults<SearchHit>> {
        let hits = self.rank(query, people).await?;
        Ok(PaginatedResults::from_all(hits, &query.pagination))
    }
}

/// Engine implementing `mode`
pub fn engine_for(mode: SearchMode) -> Result<Box<dyn SearchEngine>> {
    match mode {
        SearchMode::Exact => Ok(Box::new(crate::exact::ExactSearchEngine::new())),
        #[cfg(feature = "fuzzy")]
        SearchMode::Fuzzy => Ok(Box::new(crate::fuzzy::FuzzySearchEngine::new())),
        #[cfg(not(feature = "fuzzy"))]
        SearchMode::Fuzzy => Err(SearchError::Unsupported(
            "fuzzy search requires the `fuzzy` feature".to_string(),
        )),
    }
}
