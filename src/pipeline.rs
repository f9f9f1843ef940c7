use tracing::{debug, info, warn};

use crate::{
    error::{AppResult, IngestError},
    matcher::{CatalogMatcher, CatalogSearch},
    models::{Record, RunSummary, ShowingRecord},
    sites::Site,
    store::Store,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ingested {
    Theater,
    Showing { enriched: bool },
}

/// Validates, enriches and stores records one at a time.
pub struct Pipeline<S> {
    store: Store,
    matcher: Option<CatalogMatcher<S>>,
}

impl<S: CatalogSearch + Sync> Pipeline<S> {
    /// Without a matcher showings are stored exactly as extracted.
    pub fn new(store: Store, matcher: Option<CatalogMatcher<S>>) -> Self {
        if matcher.is_none() {
            warn!("TMDB_ACCESS_TOKEN not set, showings will be stored without posters");
        }
        Self { store, matcher }
    }

    pub async fn run(
        &self,
        site: Site,
        http: &reqwest::Client,
        delay_ms: u64,
    ) -> AppResult<RunSummary> {
        info!(site = site.slug(), "starting scrape run");
        let records = site.extract(http, delay_ms).await?;
        Ok(self.ingest_all(site.slug(), records).await)
    }

    /// Rejected records and failed writes are counted and skipped; the rest
    /// of the batch is still ingested.
    pub async fn ingest_all(&self, site: &str, records: Vec<Record>) -> RunSummary {
        let mut summary = RunSummary { site: site.to_string(), ..RunSummary::default() };

        for record in records {
            let key = record.key().to_string();
            match self.ingest(record).await {
                Ok(Ingested::Theater) => summary.theaters += 1,
                Ok(Ingested::Showing { enriched }) => {
                    summary.showings += 1;
                    if enriched {
                        summary.enriched += 1;
                    }
                },
                Err(IngestError::Validation(err)) => {
                    warn!(site = %site, key = %key, error = %err, "rejected record");
                    summary.rejected += 1;
                },
                Err(IngestError::Storage(err)) => {
                    warn!(site = %site, key = %key, error = %err, "failed to store record");
                    summary.failed += 1;
                },
            }
        }

        info!(
            site = %site,
            theaters = summary.theaters,
            showings = summary.showings,
            enriched = summary.enriched,
            rejected = summary.rejected,
            failed = summary.failed,
            "scrape run finished"
        );
        summary
    }

    pub async fn ingest(&self, record: Record) -> Result<Ingested, IngestError> {
        match record {
            Record::Theater(theater) => {
                theater.validate()?;
                self.store.put_theater(&theater).await?;
                debug!(theater_id = %theater.theater_id, name = %theater.name, "stored theater");
                Ok(Ingested::Theater)
            },
            Record::Showing(mut showing) => {
                showing.validate()?;
                let enriched = self.enrich(&mut showing).await;
                self.store.put_showing(&showing).await?;
                debug!(detail_url = %showing.detail_url, title = %showing.title, enriched, "stored showing");
                Ok(Ingested::Showing { enriched })
            },
        }
    }

    async fn enrich(&self, showing: &mut ShowingRecord) -> bool {
        let Some(matcher) = &self.matcher else {
            return false;
        };

        let candidate = matcher
            .find(&showing.title, showing.original_title.as_deref(), showing.release_year)
            .await;

        match candidate {
            Some(candidate) => {
                showing.apply_candidate(&candidate);
                true
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::Timestamp;
    use sea_orm::ConnectionTrait;

    use super::*;
    use crate::{
        error::ValidationError,
        matcher::testing::{FakeCatalog, candidate},
        models::TheaterRecord,
        store::testing::{memory_store, showing},
    };

    async fn pipeline(catalog: &Arc<FakeCatalog>) -> (Pipeline<Arc<FakeCatalog>>, Store) {
        let store = memory_store().await;
        let matcher = CatalogMatcher::new(Arc::clone(catalog));
        (Pipeline::new(store.clone(), Some(matcher)), store)
    }

    fn call(query: &str, year: Option<i32>) -> (String, Option<i32>) {
        (query.to_string(), year)
    }

    #[tokio::test]
    async fn local_title_only_uses_last_tier_and_keeps_fields() {
        let catalog = Arc::new(FakeCatalog::default());
        let (pipeline, store) = pipeline(&catalog).await;

        let mut record = showing("v1", "https://x/movies/a", "映画A");
        record.synopsis = "7月4日まで".to_string();
        record.official_website = Some("https://eiga-a.jp/".to_string());

        let result = pipeline.ingest(Record::Showing(record.clone())).await.unwrap();

        assert_eq!(result, Ingested::Showing { enriched: false });
        assert_eq!(catalog.calls(), vec![call("映画A", None)]);
        let stored = store.list_showings("v1").await.unwrap();
        assert_eq!(stored, vec![record]);
        assert_eq!(stored[0].tmdb_id, None);
        assert_eq!(stored[0].tmdb_poster_path, None);
    }

    #[tokio::test]
    async fn first_tier_hit_is_merged_into_stored_record() {
        let catalog = Arc::new(FakeCatalog::default().with_hit(
            "ドライブ・マイ・カー",
            Some(2021),
            candidate(758866, "ドライブ・マイ・カー", Some("/drive.jpg")),
        ));
        let (pipeline, store) = pipeline(&catalog).await;

        let mut record = showing("v1", "https://x/movies/drive", "Drive My Car");
        record.original_title = Some("ドライブ・マイ・カー".to_string());
        record.release_year = Some(2021);

        let result = pipeline.ingest(Record::Showing(record)).await.unwrap();

        assert_eq!(result, Ingested::Showing { enriched: true });
        assert_eq!(catalog.calls(), vec![call("ドライブ・マイ・カー", Some(2021))]);
        let stored = store.list_showings("v1").await.unwrap();
        assert_eq!(stored[0].tmdb_id, Some(758866));
        assert_eq!(stored[0].tmdb_poster_path.as_deref(), Some("/drive.jpg"));
        assert_eq!(stored[0].title, "Drive My Car");
    }

    #[tokio::test]
    async fn candidate_without_poster_is_still_stored() {
        let catalog =
            Arc::new(FakeCatalog::default().with_hit("映画B", Some(2019), candidate(5, "映画B", None)));
        let (pipeline, store) = pipeline(&catalog).await;

        let mut record = showing("v1", "https://x/movies/b", "映画B");
        record.release_year = Some(2019);
        pipeline.ingest(Record::Showing(record)).await.unwrap();

        let stored = store.list_showings("v1").await.unwrap();
        assert_eq!(stored[0].tmdb_id, Some(5));
        assert_eq!(stored[0].tmdb_poster_path, None);
    }

    #[tokio::test]
    async fn reingesting_same_url_overwrites() {
        let catalog = Arc::new(FakeCatalog::default());
        let (pipeline, store) = pipeline(&catalog).await;

        let mut first = showing("v1", "https://x/movies/a", "映画A");
        first.synopsis = "first".to_string();
        pipeline.ingest(Record::Showing(first)).await.unwrap();

        let mut second = showing("v1", "https://x/movies/a", "映画A");
        second.synopsis = "second".to_string();
        second.updated_at = Timestamp::from_second(1_735_776_000).unwrap();
        pipeline.ingest(Record::Showing(second.clone())).await.unwrap();

        assert_eq!(store.list_showings("v1").await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn invalid_showing_is_rejected_without_search_or_write() {
        let catalog = Arc::new(FakeCatalog::default());
        let (pipeline, store) = pipeline(&catalog).await;

        let record = showing("", "https://x/movies/a", "映画A");
        let err = pipeline.ingest(Record::Showing(record)).await.unwrap_err();

        assert!(matches!(err, IngestError::Validation(ValidationError::MissingField("theater_id"))));
        assert!(catalog.calls().is_empty());
        assert!(store.list_showings("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_enrichment_stores_record_as_is() {
        let store = memory_store().await;
        let pipeline: Pipeline<FakeCatalog> = Pipeline::new(store.clone(), None);

        let record = showing("v1", "https://x/movies/a", "映画A");
        let result = pipeline.ingest(Record::Showing(record.clone())).await.unwrap();

        assert_eq!(result, Ingested::Showing { enriched: false });
        assert_eq!(store.list_showings("v1").await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn run_counts_stored_enriched_and_rejected() {
        let catalog =
            Arc::new(FakeCatalog::default().with_hit("映画A", None, candidate(1, "映画A", Some("/a.jpg"))));
        let (pipeline, store) = pipeline(&catalog).await;

        let theater = TheaterRecord {
            theater_id: "v1".to_string(),
            name: "Venue One".to_string(),
            official_url: "https://x/".to_string(),
            last_updated: Timestamp::from_second(1_735_689_600).unwrap(),
        };
        let records = vec![
            Record::Theater(theater.clone()),
            Record::Showing(showing("v1", "https://x/movies/a", "映画A")),
            Record::Showing(showing("v1", "https://x/movies/b", "映画B")),
            Record::Showing(showing("v1", "", "no url")),
        ];

        let summary = pipeline.ingest_all("v1", records).await;

        assert_eq!(
            summary,
            RunSummary {
                site: "v1".to_string(),
                theaters: 1,
                showings: 2,
                enriched: 1,
                rejected: 1,
                failed: 0,
            }
        );
        assert_eq!(store.list_theaters().await.unwrap(), vec![theater]);
        assert_eq!(store.list_showings("v1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn storage_failure_skips_record_and_keeps_going() {
        let db = crate::db::connect_and_migrate("sqlite::memory:").await.unwrap();
        db.execute_unprepared("DROP TABLE showing").await.unwrap();
        let store = Store::new(db);
        let pipeline: Pipeline<FakeCatalog> = Pipeline::new(store.clone(), None);

        let theater = TheaterRecord {
            theater_id: "v1".to_string(),
            name: "Venue One".to_string(),
            official_url: "https://x/".to_string(),
            last_updated: Timestamp::now(),
        };
        let records = vec![
            Record::Showing(showing("v1", "https://x/movies/a", "映画A")),
            Record::Showing(showing("v1", "", "no url")),
            Record::Theater(theater.clone()),
        ];

        let summary = pipeline.ingest_all("v1", records).await;

        assert_eq!((summary.failed, summary.rejected, summary.theaters), (1, 1, 1));
        assert_eq!(summary.showings, 0);
        assert_eq!(store.list_theaters().await.unwrap(), vec![theater]);
    }
}
