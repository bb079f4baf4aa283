//! Fuzzy search using nucleo

use async_trait::async_trait;
use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

use crate::traits::{Result, SearchEngine, SearchHit};
use nasab_core::{Person, PersonQuery};

/// Stateless fuzzy search engine using nucleo
///
/// Scores names only; notes are too long to rank meaningfully. Results are
/// ordered by descending score, ties by id.
pub struct FuzzySearchEngine {
    /// Hits scoring below this are dropped
    pub min_score: u32,
}

impl FuzzySearchEngine {
    pub fn new() -> Self {
        Self { min_score: 0 }
    }

    pub fn with_min_score(mut self, min_score: u32) -> Self {
        self.min_score = min_score;
        self
    }

    fn score_person(person: &Person, pattern: &Pattern, matcher: &mut Matcher) -> Option<u32> {
        let mut buf = Vec::new();
        pattern.score(Utf32Str::new(&person.name, &mut buf), matcher)
    }
}

impl Default for FuzzySearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchEngine for FuzzySearchEngine {
    async fn rank(&self, query: &PersonQuery, people: &[Person]) -> Result<Vec<SearchHit>> {
        let candidates = people.iter().filter(|p| query.matches_gender(p.gender));

        let Some(text) = query.trimmed_text() else {
            // No text query, just filter by gender
            let mut all: Vec<&Person> = candidates.collect();
            all.sort_by_key(|p| p.id);
            return Ok(all
                .into_iter()
                .map(|person| SearchHit {
                    person: person.clone(),
                    score: 0,
                })
                .collect());
        };

        let pattern = Pattern::new(
            text,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        let mut matcher = Matcher::new(Config::DEFAULT);

        let mut scored: Vec<SearchHit> = candidates
            .filter_map(|person| {
                Self::score_person(person, &pattern, &mut matcher)
                    .filter(|score| *score >= self.min_score)
                    .map(|score| SearchHit {
                        person: person.clone(),
                        score,
                    })
            })
            .collect();

        // Sort by score descending
        scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.person.id.cmp(&b.person.id)));

        tracing::debug!("Fuzzy search for {:?} matched {} people", text, scored.len());
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nasab_core::Gender;

    fn people() -> Vec<Person> {
        vec![
            Person::new(1, "Fatimah", Gender::Female),
            Person::new(2, "Fathiyah", Gender::Female),
            Person::new(3, "Hasan", Gender::Male),
            Person::new(4, "Fatih", Gender::Male),
        ]
    }

    #[tokio::test]
    async fn test_fuzzy_search() {
        let search = FuzzySearchEngine::new();
        let results = search.search(&PersonQuery::new("fatimah"), &people()).await.unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].name, "Fatimah");
        assert!(!results.iter().any(|p| p.name == "Hasan"));
    }

    #[tokio::test]
    async fn test_fuzzy_search_missing_letter() {
        let search = FuzzySearchEngine::new();
        let results = search.search(&PersonQuery::new("Fatma"), &people()).await.unwrap();

        // Fuzzy should still find Fatimah with a letter left out
        assert!(results.iter().any(|p| p.name == "Fatimah"));
    }

    #[tokio::test]
    async fn test_fuzzy_search_gender_filter() {
        let search = FuzzySearchEngine::new();
        let query = PersonQuery::new("fat").with_gender(Gender::Male);
        let results = search.search(&query, &people()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Fatih");
    }

    #[tokio::test]
    async fn test_fuzzy_search_scores_descending() {
        let search = FuzzySearchEngine::new();
        let hits = search.rank(&PersonQuery::new("fat"), &people()).await.unwrap();

        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_engine_for_mode() {
        let engine = crate::engine_for(nasab_core::SearchMode::Fuzzy).unwrap();
        let results = engine.search(&PersonQuery::new("hsn"), &people()).await.unwrap();
        assert_eq!(results[0].name, "Hasan");
    }
}
