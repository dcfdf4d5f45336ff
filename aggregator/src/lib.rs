pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod metrics_defs;
pub mod sorter;
pub mod source;
pub mod types;

#[cfg(test)]
mod testutils;

use crate::aggregator::{Aggregator, Timeouts};
use crate::cache::PostCache;
use crate::source::HttpSource;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("invalid provider endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] config::ValidationError),
}

/// Wires the cache, the HTTP provider client and the aggregator from config.
pub fn build_aggregator(config: &config::Config) -> Result<Aggregator, ServerError> {
    config.validate()?;

    let source = HttpSource::new(config.provider.endpoint()?, config.provider.http_timeout())?;
    let cache = Arc::new(PostCache::new(config.cache.ttl()));

    Ok(Aggregator::new(
        cache,
        Arc::new(source),
        Timeouts::from(&config.aggregation),
    ))
}

pub async fn run(config: config::Config) -> Result<(), ServerError> {
    let aggregator = Arc::new(build_aggregator(&config)?);
    let app = api::router(aggregator);

    let listener = TcpListener::bind((config.listener.host.as_str(), config.listener.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
