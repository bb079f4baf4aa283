//! Exact search engine - simple substring matching

use async_trait::async_trait;

use crate::traits::{Result, SearchEngine, SearchHit};
use nasab_core::{Person, PersonQuery};

/// Case-insensitive substring search over names and notes (stateless)
pub struct ExactSearchEngine;

impl ExactSearchEngine {
    pub fn new() -> Self {
        Self
    }

    fn matches_query(person: &Person, query: &PersonQuery) -> bool {
        if !query.matches_gender(person.gender) {
            return false;
        }

        if let Some(text) = query.trimmed_text() {
            let needle = text.to_lowercase();
            let in_name = person.name.to_lowercase().contains(&needle);
            let in_notes = person
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&needle));
            if !in_name && !in_notes {
                return false;
            }
        }

        true
    }
}

impl Default for ExactSearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchEngine for ExactSearchEngine {
    async fn rank(&self, query: &PersonQuery, people: &[Person]) -> Result<Vec<SearchHit>> {
        let mut results: Vec<&Person> = people
            .iter()
            .filter(|person| Self::matches_query(person, query))
            .collect();
        results.sort_by_key(|person| person.id);

        Ok(results
            .into_iter()
            .map(|person| SearchHit {
                person: person.clone(),
                score: 0,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nasab_core::Gender;

    fn people() -> Vec<Person> {
        vec![
            Person::new(1, "Muhammad Ali", Gender::Male),
            Person::new(2, "Aliyah", Gender::Female).with_notes("born in Medina"),
            Person::new(3, "Umar", Gender::Male).with_notes("Lived with ALI's family"),
            Person::new(4, "Khadijah", Gender::Female),
        ]
    }

    #[tokio::test]
    async fn test_exact_search_case_insensitive() {
        let search = ExactSearchEngine::new();
        let results = search.search(&PersonQuery::new("ali"), &people()).await.unwrap();

        let ids: Vec<u64> = results.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exact_search_notes() {
        let search = ExactSearchEngine::new();
        let results = search.search(&PersonQuery::new("MEDINA"), &people()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Aliyah");
    }

    #[tokio::test]
    async fn test_exact_search_gender_filter() {
        let search = ExactSearchEngine::new();
        let query = PersonQuery::new("ali").with_gender(Gender::Female);
        let results = search.search(&query, &people()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Aliyah");
    }

    #[tokio::test]
    async fn test_exact_search_without_text() {
        let search = ExactSearchEngine::new();
        let query = PersonQuery::all().with_gender(Gender::Male);
        let results = search.search(&query, &people()).await.unwrap();

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_exact_search_pagination() {
        let search = ExactSearchEngine::new();
        let query = PersonQuery::all().with_pagination(1, 3);

        let results = search.search(&query, &people()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Khadijah");

        let page = search.search_page(&query, &people()).await.unwrap();
        assert_eq!(page.pagination.total_count, 4);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(!page.pagination.has_next_page);
    }
}
