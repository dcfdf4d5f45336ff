use aggregator::config::Config as AggregatorConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(flatten)]
    pub service: AggregatorConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data: Config = serde_yaml::from_reader(file)?;
        data.service.validate()?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    ValidationError(#[from] aggregator::config::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            listener:
                host: 0.0.0.0
                port: 8080
            provider:
                base_url: https://api.hatchways.io
            cache:
                ttl_secs: 5
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            logging:
                sentry_dsn: https://key@sentry.example.com/1
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.service.listener.host, "0.0.0.0");
        assert_eq!(
            config.service.provider.base_url.as_str(),
            "https://api.hatchways.io/"
        );
        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );
        assert_eq!(
            config.common.logging.map(|l| l.sentry_dsn),
            Some("https://key@sentry.example.com/1".to_string())
        );
    }

    #[test]
    fn common_sections_are_optional() {
        let tmp = write_tmp_file("provider:\n    base_url: http://127.0.0.1:9000\n");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.common, CommonConfig::default());
        assert_eq!(config.service.listener.port, 8080);
    }

    #[test]
    fn invalid_config() {
        let tmp = write_tmp_file(
            "provider:\n    base_url: http://127.0.0.1:9000\nlistener:\n    host: 0.0.0.0\n    port: 0\n",
        );
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ValidationError(_))
        ));

        assert!(matches!(
            Config::from_file(std::path::Path::new("/nonexistent/postfeed.yaml")),
            Err(ConfigError::LoadError(_))
        ));

        let tmp = write_tmp_file("listener: [not, a, map]\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
