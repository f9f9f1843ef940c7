use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    /// Unset or blank disables poster enrichment.
    pub tmdb_access_token: Option<String>,
    pub tmdb_base_url: String,
    pub tmdb_language: String,
    pub tmdb_min_interval: Duration,
    pub tmdb_poster_size: String,
    pub request_timeout: Duration,
    pub scrape_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://marquee.db?mode=rwc".to_string());

        let tmdb_access_token =
            std::env::var("TMDB_ACCESS_TOKEN").ok().filter(|token| !token.trim().is_empty());
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_language =
            std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "ja-JP".to_string());

        let tmdb_min_interval_ms: u64 =
            std::env::var("TMDB_MIN_INTERVAL_MS").ok().and_then(|s| s.parse().ok()).unwrap_or(100);

        let tmdb_poster_size =
            std::env::var("TMDB_POSTER_SIZE").unwrap_or_else(|_| "w300".to_string());

        let request_timeout_secs: u64 =
            std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let scrape_delay_ms: u64 =
            std::env::var("SCRAPE_DELAY_MS").ok().and_then(|s| s.parse().ok()).unwrap_or(250);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_language,
            tmdb_min_interval: Duration::from_millis(tmdb_min_interval_ms),
            tmdb_poster_size,
            request_timeout: Duration::from_secs(request_timeout_secs),
            scrape_delay_ms,
        })
    }
}
