use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketmood_core::config::Settings;
use marketmood_core::pipeline::run::{
    correlate_stage, fetch_stage, run_pipeline, score_stage, PipelineClients, PipelineOptions,
    PipelineStageError, DEFAULT_DAYS, DEFAULT_QUERY, DEFAULT_TICKER,
};
use marketmood_core::sentiment::SentimentScorer;
use marketmood_core::storage::sentiment::read_sentiment;
use marketmood_core::storage::DataPaths;

mod smoke;

#[derive(Debug, Parser)]
#[command(name = "marketmood_worker", about = "Financial news sentiment pipeline")]
struct Args {
    /// Directory for news.csv, sentiment_results.csv and charts. Overrides MARKETMOOD_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch, score and correlate (the default).
    Run {
        #[command(flatten)]
        news: NewsArgs,
        #[command(flatten)]
        market: MarketArgs,
    },
    /// Fetch headlines into news.csv.
    Fetch {
        #[command(flatten)]
        news: NewsArgs,
    },
    /// Score news.csv into sentiment_results.csv.
    Score,
    /// Join sentiment_results.csv with prices and draw the chart.
    Correlate {
        #[command(flatten)]
        market: MarketArgs,
    },
    /// Fetch one day of news and check news.csv was written.
    Smoke,
}

#[derive(Debug, ClapArgs)]
struct NewsArgs {
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Look-back window in days.
    #[arg(long, default_value_t = DEFAULT_DAYS)]
    days: u32,
}

#[derive(Debug, ClapArgs)]
struct MarketArgs {
    #[arg(long, default_value = DEFAULT_TICKER)]
    ticker: String,

    /// Chart output path. Defaults to {data_dir}/{ticker}_sentiment_vs_price.svg.
    #[arg(long)]
    chart_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    if settings.require_newsapi_key().is_err() {
        tracing::warn!("NEWSAPI_KEY not set; headlines will come from Google News RSS");
    }

    let command = args.command.unwrap_or(Command::Run {
        news: NewsArgs {
            query: DEFAULT_QUERY.to_string(),
            days: DEFAULT_DAYS,
        },
        market: MarketArgs {
            ticker: DEFAULT_TICKER.to_string(),
            chart_out: None,
        },
    });

    let result = execute(&settings, command).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        match err.downcast_ref::<PipelineStageError>() {
            Some(stage) => {
                tracing::error!(stage = stage.stage, error = %stage.detail, "pipeline run failed")
            }
            None => tracing::error!(error = %format!("{err:#}"), "worker command failed"),
        }
    }
    result
}

async fn execute(settings: &Settings, command: Command) -> anyhow::Result<()> {
    let paths = DataPaths::from_settings(settings);
    let started_at = chrono::Utc::now();

    match command {
        Command::Run { news, market } => {
            let clients = PipelineClients::from_settings(settings)?;
            let mut scorer = SentimentScorer::from_settings(settings);
            let opts = PipelineOptions {
                query: news.query,
                days: news.days,
                ticker: market.ticker,
                chart_path: market.chart_out,
            };
            let report = run_pipeline(clients.sources(), &mut scorer, &paths, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Fetch { news } => {
            let clients = PipelineClients::from_settings(settings)?;
            let fetched = fetch_stage(clients.sources(), &paths, &news.query, news.days).await?;
            println!(
                "fetched {} articles from {} into {}",
                fetched.articles.len(),
                fetched.source,
                paths.news().display()
            );
        }
        Command::Score => {
            let mut scorer = SentimentScorer::from_settings(settings);
            let (records, path) = score_stage(&mut scorer, &paths)?;
            println!("scored {} headlines into {}", records.len(), path.display());
        }
        Command::Correlate { market } => {
            let clients = PipelineClients::from_settings(settings)?;
            let records = read_sentiment(&paths)?;
            let report = correlate_stage(
                clients.sources(),
                &paths,
                &records,
                &market.ticker,
                market.chart_out,
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Smoke => {
            let clients = PipelineClients::from_settings(settings)?;
            let report = smoke::run_smoke(clients.sources(), &paths).await?;
            println!(
                "smoke test passed: {} rows from {}",
                report.rows, report.source
            );
        }
    }

    let elapsed_ms = (chrono::Utc::now() - started_at).num_milliseconds();
    tracing::info!(elapsed_ms, "worker command finished");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_full_run() {
        let args = Args::try_parse_from(["marketmood_worker"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn run_flags_have_defaults() {
        let args = Args::try_parse_from(["marketmood_worker", "run"]).unwrap();
        match args.command {
            Some(Command::Run { news, market }) => {
                assert_eq!(news.query, "stock market");
                assert_eq!(news.days, 2);
                assert_eq!(market.ticker, "AAPL");
                assert!(market.chart_out.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn data_dir_is_global() {
        let args = Args::try_parse_from([
            "marketmood_worker",
            "correlate",
            "--ticker",
            "MSFT",
            "--data-dir",
            "/tmp/mm",
        ])
        .unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/mm")));
        assert!(matches!(
            args.command,
            Some(Command::Correlate { market }) if market.ticker == "MSFT"
        ));
    }

    #[test]
    fn rejects_non_numeric_days() {
        assert!(Args::try_parse_from(["marketmood_worker", "fetch", "--days", "two"]).is_err());
    }
}
