use aggregator::types::{AggregationRequest, SortDirection, SortField};
use clap::{Args, Parser};
use std::error::Error;
use std::path::PathBuf;

mod config;
mod telemetry;

#[derive(Parser)]
#[command(name = "postfeed", about = "Aggregates blog posts across tags")]
enum CliCommand {
    /// Serve the posts API
    Serve(ServeArgs),
    /// Run a single aggregation and print the posts as JSON
    Query(QueryArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    config: PathBuf,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    config: PathBuf,
    /// Comma separated list of tags
    #[arg(long, value_delimiter = ',', required = true)]
    tags: Vec<String>,
    #[arg(long, default_value = "id")]
    sort_by: SortField,
    #[arg(long, default_value = "asc")]
    direction: SortDirection,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = CliCommand::parse();

    let config_path = match &cli {
        CliCommand::Serve(args) => &args.config,
        CliCommand::Query(args) => &args.config,
    };
    let config = config::Config::from_file(config_path)?;

    // Sentry must be initialized before the runtime starts
    let _sentry_guard = telemetry::init(&config.common)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli {
        CliCommand::Serve(_) => {
            tracing::info!("Starting postfeed");
            rt.block_on(aggregator::run(config.service))?;
        }
        CliCommand::Query(args) => {
            let aggregator = aggregator::build_aggregator(&config.service)?;
            let request =
                AggregationRequest::new(args.tags).sorted_by(args.sort_by, args.direction);

            let result = rt.block_on(aggregator.aggregate(&request));
            println!("{}", serde_json::to_string_pretty(&result.posts)?);

            if !result.failures.is_empty() {
                return Err(format!(
                    "{} of {} tags failed: {}",
                    result.failures.len(),
                    request.tags.len(),
                    result.failed_tags().collect::<Vec<_>>().join(",")
                )
                .into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_command() {
        let cli = CliCommand::try_parse_from([
            "postfeed",
            "query",
            "--config",
            "postfeed.yaml",
            "--tags",
            "tech,health",
            "--sort-by",
            "likes",
            "--direction",
            "desc",
        ])
        .unwrap();

        let CliCommand::Query(args) = cli else {
            panic!("expected query command");
        };
        assert_eq!(args.tags, vec!["tech", "health"]);
        assert_eq!(args.sort_by, SortField::Likes);
        assert_eq!(args.direction, SortDirection::Desc);
    }

    #[test]
    fn test_parse_rejects_invalid_sort() {
        assert!(
            CliCommand::try_parse_from([
                "postfeed", "query", "--config", "c.yaml", "--tags", "tech", "--sort-by", "author",
            ])
            .is_err()
        );
        assert!(CliCommand::try_parse_from(["postfeed", "query", "--config", "c.yaml"]).is_err());
    }
}
