use tracing::{debug, info, warn};

use crate::{error::AppResult, models::CatalogCandidate};

/// A catalog that can be searched by title with an optional release year.
/// Results come back in the catalog's relevance order.
pub trait CatalogSearch {
    fn search(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> impl Future<Output = AppResult<Vec<CatalogCandidate>>> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchStep<'a> {
    tier: u8,
    query: &'a str,
    year: Option<i32>,
}

pub struct CatalogMatcher<S> {
    catalog: S,
}

impl<S: CatalogSearch> CatalogMatcher<S> {
    pub fn new(catalog: S) -> Self {
        Self { catalog }
    }

    /// Tries (original, year), (original), (local, year), (local) in that
    /// order and returns the top hit of the first search that has one.
    pub async fn find(
        &self,
        local_title: &str,
        original_title: Option<&str>,
        year: Option<i32>,
    ) -> Option<CatalogCandidate> {
        for step in search_plan(local_title, original_title, year) {
            if let Some(candidate) = self.attempt(step).await {
                info!(
                    tier = step.tier,
                    title = %local_title,
                    tmdb_id = candidate.id,
                    matched = %candidate.title,
                    original = ?candidate.original_title,
                    release_date = ?candidate.release_date,
                    "matched catalog entry"
                );
                return Some(candidate);
            }
        }

        debug!(title = %local_title, "no catalog match");
        None
    }

    async fn attempt(&self, step: SearchStep<'_>) -> Option<CatalogCandidate> {
        match self.catalog.search(step.query, step.year).await {
            Ok(results) => {
                debug!(tier = step.tier, query = %step.query, year = ?step.year, results = results.len(), "catalog search");
                results.into_iter().next()
            },
            Err(err) => {
                warn!(tier = step.tier, query = %step.query, year = ?step.year, error = %err, "catalog search failed");
                None
            },
        }
    }
}

fn search_plan<'a>(
    local_title: &'a str,
    original_title: Option<&'a str>,
    year: Option<i32>,
) -> Vec<SearchStep<'a>> {
    let original_title = original_title.map(str::trim).filter(|t| !t.is_empty());

    let mut steps = Vec::with_capacity(4);
    if let (Some(original), Some(year)) = (original_title, year) {
        steps.push(SearchStep { tier: 1, query: original, year: Some(year) });
    }
    if let Some(original) = original_title {
        steps.push(SearchStep { tier: 2, query: original, year: None });
    }
    if let Some(year) = year {
        steps.push(SearchStep { tier: 3, query: local_title, year: Some(year) });
    }
    steps.push(SearchStep { tier: 4, query: local_title, year: None });
    steps
}


#[cfg(test)]
mod tests {
    use super::{
        testing::{FakeCatalog, candidate},
        *,
    };

    fn call(query: &str, year: Option<i32>) -> (String, Option<i32>) {
        (query.to_string(), year)
    }

    #[test]
    fn plan_without_original_or_year_is_local_only() {
        let steps = search_plan("映画A", None, None);
        assert_eq!(steps, vec![SearchStep { tier: 4, query: "映画A", year: None }]);
    }

    #[test]
    fn plan_treats_blank_original_as_absent() {
        let tiers: Vec<u8> =
            search_plan("映画A", Some("  "), Some(2020)).iter().map(|s| s.tier).collect();
        assert_eq!(tiers, vec![3, 4]);
    }

    #[test]
    fn plan_with_everything_has_four_tiers_in_order() {
        let steps = search_plan("Drive My Car", Some("ドライブ・マイ・カー"), Some(2021));
        assert_eq!(
            steps,
            vec![
                SearchStep { tier: 1, query: "ドライブ・マイ・カー", year: Some(2021) },
                SearchStep { tier: 2, query: "ドライブ・マイ・カー", year: None },
                SearchStep { tier: 3, query: "Drive My Car", year: Some(2021) },
                SearchStep { tier: 4, query: "Drive My Car", year: None },
            ]
        );
    }

    #[tokio::test]
    async fn first_tier_hit_stops_the_search() {
        let catalog = FakeCatalog::default()
            .with_hit("ドライブ・マイ・カー", Some(2021), candidate(758866, "ドライブ・マイ・カー", Some("/p.jpg")))
            .with_hit("ドライブ・マイ・カー", None, candidate(1, "wrong", None));
        let matcher = CatalogMatcher::new(catalog);

        let found = matcher.find("Drive My Car", Some("ドライブ・マイ・カー"), Some(2021)).await;

        assert_eq!(found.map(|c| c.id), Some(758866));
        assert_eq!(matcher.catalog.calls(), vec![call("ドライブ・マイ・カー", Some(2021))]);
    }

    #[tokio::test]
    async fn top_ranked_result_is_picked() {
        let catalog = FakeCatalog::default()
            .with_hit("映画A", None, candidate(10, "映画A", None))
            .with_hit("映画A", None, candidate(11, "映画A", Some("/other.jpg")));
        let matcher = CatalogMatcher::new(catalog);

        assert_eq!(matcher.find("映画A", None, None).await.map(|c| c.id), Some(10));
    }

    #[tokio::test]
    async fn empty_tiers_fall_through_in_order() {
        let catalog =
            FakeCatalog::default().with_hit("Drive My Car", None, candidate(7, "Drive My Car", None));
        let matcher = CatalogMatcher::new(catalog);

        let found = matcher.find("Drive My Car", Some("ドライブ・マイ・カー"), Some(2021)).await;

        assert_eq!(found.map(|c| c.id), Some(7));
        assert_eq!(
            matcher.catalog.calls(),
            vec![
                call("ドライブ・マイ・カー", Some(2021)),
                call("ドライブ・マイ・カー", None),
                call("Drive My Car", Some(2021)),
                call("Drive My Car", None),
            ]
        );
    }

    #[tokio::test]
    async fn failed_search_is_treated_as_empty() {
        let catalog = FakeCatalog::default()
            .with_failure("Original", None)
            .with_hit("ローカル", None, candidate(3, "ローカル", None));
        let matcher = CatalogMatcher::new(catalog);

        let found = matcher.find("ローカル", Some("Original"), None).await;

        assert_eq!(found.map(|c| c.id), Some(3));
        assert_eq!(matcher.catalog.calls(), vec![call("Original", None), call("ローカル", None)]);
    }

    #[tokio::test]
    async fn no_hits_anywhere_is_none() {
        let matcher = CatalogMatcher::new(FakeCatalog::default());

        assert_eq!(matcher.find("映画A", None, Some(1999)).await, None);
        assert_eq!(matcher.catalog.calls(), vec![call("映画A", Some(1999)), call("映画A", None)]);
    }

    #[tokio::test]
    async fn local_only_record_searches_tier_four_once() {
        let matcher = CatalogMatcher::new(FakeCatalog::default());

        assert_eq!(matcher.find("映画A", None, None).await, None);
        assert_eq!(matcher.catalog.calls(), vec![call("映画A", None)]);
    }
}
