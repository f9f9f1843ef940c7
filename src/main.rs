mod config;
mod db;
mod entities;
mod error;
mod matcher;
mod models;
mod pipeline;
mod routes;
mod sites;
mod store;
mod templates;
mod tmdb;

use std::sync::Arc;

use crate::{
    config::Config, matcher::CatalogMatcher, pipeline::Pipeline, sites::Site, store::Store,
    tmdb::TmdbClient,
};

pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub store: Store,
    pub pipeline: Arc<Pipeline<TmdbClient>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("marquee/0.1")
        .timeout(config.request_timeout)
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = Store::new(db);

    let matcher = config
        .tmdb_access_token
        .as_ref()
        .map(|token| {
            TmdbClient::new(
                http.clone(),
                token.clone(),
                config.tmdb_base_url.clone(),
                config.tmdb_language.clone(),
                config.tmdb_min_interval,
            )
            .map(CatalogMatcher::new)
        })
        .transpose()?;
    let pipeline = Arc::new(Pipeline::new(store.clone(), matcher));

    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        anyhow::ensure!(command == "scrape", "unknown command: {command} (expected `scrape [site]`)");
        let sites = match args.next() {
            Some(slug) => {
                vec![Site::from_slug(&slug).ok_or_else(|| anyhow::anyhow!("unknown site: {slug}"))?]
            },
            None => Site::ALL.to_vec(),
        };
        let mut failed = 0;
        for site in sites {
            if let Err(err) = pipeline.run(site, &http, config.scrape_delay_ms).await {
                tracing::error!(site = site.slug(), error = %err, "scrape run failed");
                failed += 1;
            }
        }
        anyhow::ensure!(failed == 0, "{failed} scrape run(s) failed");
        return Ok(());
    }

    let state = Arc::new(AppState { config: config.clone(), http, store, pipeline });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
