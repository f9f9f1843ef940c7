use std::{num::NonZeroU32, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{AppResult, CatalogError},
    matcher::CatalogSearch,
    models::CatalogCandidate,
};

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    language: String,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl TmdbClient {
    /// Every request waits until at least `min_interval` has passed since the
    /// previous one made through this client.
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        base_url: String,
        language: String,
        min_interval: Duration,
    ) -> Result<Self, CatalogError> {
        if access_token.trim().is_empty() {
            return Err(CatalogError::MissingCredential);
        }

        let limiter = RateLimiter::direct(interval_quota(min_interval));
        Ok(Self { client, access_token, base_url, language, limiter })
    }

    pub async fn search_movie(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> AppResult<Vec<CatalogCandidate>> {
        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let mut req = self.client.get(url).bearer_auth(&self.access_token).query(&[
            ("query", query),
            ("language", self.language.as_str()),
            ("page", "1"),
        ]);
        if let Some(year) = year {
            req = req.query(&[("year", year)]);
        }

        let resp: SearchResponse = req.send().await?.error_for_status()?.json().await?;
        debug!(query = %query, year = ?year, total_results = resp.total_results, "searched TMDB");

        Ok(resp.results.into_iter().map(CatalogCandidate::from).collect())
    }
}

impl CatalogSearch for TmdbClient {
    async fn search(&self, query: &str, year: Option<i32>) -> AppResult<Vec<CatalogCandidate>> {
        self.search_movie(query, year).await
    }
}

/// Builds an image URL from a stored poster path. No request is made.
pub fn poster_url(poster_path: &str, size: &str) -> String {
    if poster_path.is_empty() {
        return String::new();
    }
    format!("{IMAGE_BASE_URL}{size}{poster_path}")
}

fn interval_quota(min_interval: Duration) -> Quota {
    let period = min_interval.max(Duration::from_micros(1));
    match Quota::with_period(period) {
        Some(quota) => quota.allow_burst(NonZeroU32::MIN),
        None => Quota::per_second(NonZeroU32::MIN),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_results: u32,
    results: Vec<SearchMovie>,
}

#[derive(Debug, Deserialize)]
struct SearchMovie {
    id: i32,
    #[serde(default)]
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
}

impl From<SearchMovie> for CatalogCandidate {
    fn from(movie: SearchMovie) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            id: movie.id,
            title: movie.title,
            original_title: non_empty(movie.original_title),
            release_date: non_empty(movie.release_date),
            poster_path: non_empty(movie.poster_path),
        }
    }
}
