use crate::config::{CommonConfig, MetricsConfig};
use aggregator::metrics_defs::ALL_METRICS;
use metrics_exporter_statsd::StatsdBuilder;
use shared::metrics_defs::describe_all;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const METRICS_PREFIX: &str = "postfeed";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("could not build statsd exporter: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("could not install metrics recorder: {0}")]
    Recorder(String),
    #[error("invalid sentry DSN: {0}")]
    InvalidDsn(#[from] sentry::types::ParseDsnError),
}

/// Sets up logging, error reporting and metrics for the process.
///
/// The returned guard flushes pending Sentry events on drop, keep it alive
/// until the process exits.
pub fn init(config: &CommonConfig) -> Result<Option<sentry::ClientInitGuard>, TelemetryError> {
    let sentry_guard = match &config.logging {
        Some(logging) => {
            let dsn: sentry::types::Dsn = logging.sentry_dsn.parse()?;
            Some(sentry::init(sentry::ClientOptions {
                dsn: Some(dsn),
                release: sentry::release_name!(),
                ..Default::default()
            }))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            sentry_guard
                .is_some()
                .then(sentry::integrations::tracing::layer),
        )
        .init();

    if let Some(metrics) = &config.metrics {
        init_metrics(metrics)?;
    }

    Ok(sentry_guard)
}

fn init_metrics(config: &MetricsConfig) -> Result<(), TelemetryError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;

    metrics::set_global_recorder(recorder).map_err(|e| TelemetryError::Recorder(e.to_string()))?;
    describe_all(ALL_METRICS);

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "statsd metrics enabled"
    );
    Ok(())
}
