//! Full fetch → score → correlate run.
//!
//! Stages run strictly one after another. A failing stage stops the run and is
//! reported as a [`PipelineStageError`] naming that stage; files written by
//! earlier stages are kept.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::correlate::{correlate_with_stock, CorrelationReport};
use crate::domain::SentimentRecord;
use crate::ingest::google_rss::GoogleRssClient;
use crate::ingest::newsapi::NewsApiClient;
use crate::ingest::{fetch_with_fallback, FetchedNews, NewsSource};
use crate::market::{PriceSource, YahooChartClient};
use crate::pipeline::run_sentiment_pipeline;
use crate::sentiment::SentimentScorer;
use crate::storage::news::write_news;
use crate::storage::DataPaths;

pub const DEFAULT_QUERY: &str = "stock market";
pub const DEFAULT_DAYS: u32 = 2;
pub const DEFAULT_TICKER: &str = "AAPL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub query: String,
    pub days: u32,
    pub ticker: String,
    /// Defaults to `{data_dir}/{ticker}_sentiment_vs_price.svg`.
    pub chart_path: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            days: DEFAULT_DAYS,
            ticker: DEFAULT_TICKER.to_string(),
            chart_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: uuid::Uuid,
    pub news_source: String,
    pub article_count: usize,
    pub model_available: bool,
    pub sentiment_path: PathBuf,
    pub correlation: CorrelationReport,
}

/// A stage of the pipeline failed. `detail` is the full error chain.
#[derive(Debug, Clone)]
pub struct PipelineStageError {
    pub stage: &'static str,
    pub detail: String,
}

impl fmt::Display for PipelineStageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.detail)
    }
}

impl std::error::Error for PipelineStageError {}

fn stage_error(stage: &'static str) -> impl FnOnce(anyhow::Error) -> anyhow::Error {
    move |err| {
        PipelineStageError {
            stage,
            detail: format!("{err:#}"),
        }
        .into()
    }
}

/// Borrowed adapters for one run.
#[derive(Clone, Copy)]
pub struct PipelineSources<'a> {
    pub news_primary: Option<&'a dyn NewsSource>,
    pub news_fallback: &'a dyn NewsSource,
    pub prices: &'a dyn PriceSource,
}

/// Production adapters built from settings.
pub struct PipelineClients {
    newsapi: NewsApiClient,
    rss: GoogleRssClient,
    yahoo: YahooChartClient,
}

impl PipelineClients {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            newsapi: NewsApiClient::from_settings(settings)?,
            rss: GoogleRssClient::from_settings(settings)?,
            yahoo: YahooChartClient::from_settings(settings)?,
        })
    }

    pub fn sources(&self) -> PipelineSources<'_> {
        PipelineSources {
            news_primary: Some(&self.newsapi),
            news_fallback: &self.rss,
            prices: &self.yahoo,
        }
    }
}

pub async fn fetch_stage(
    sources: PipelineSources<'_>,
    paths: &DataPaths,
    query: &str,
    days: u32,
) -> anyhow::Result<FetchedNews> {
    let fetched =
        fetch_with_fallback(sources.news_primary, sources.news_fallback, query, days).await?;
    write_news(paths, &fetched.articles)?;
    Ok(fetched)
}

pub fn score_stage(
    scorer: &mut SentimentScorer,
    paths: &DataPaths,
) -> anyhow::Result<(Vec<SentimentRecord>, PathBuf)> {
    run_sentiment_pipeline(scorer, paths)
}

pub async fn correlate_stage(
    sources: PipelineSources<'_>,
    paths: &DataPaths,
    records: &[SentimentRecord],
    ticker: &str,
    chart_path: Option<PathBuf>,
) -> anyhow::Result<CorrelationReport> {
    let chart_path = chart_path.unwrap_or_else(|| paths.chart(ticker));
    correlate_with_stock(records, ticker, sources.prices, &chart_path).await
}

pub async fn run_pipeline(
    sources: PipelineSources<'_>,
    scorer: &mut SentimentScorer,
    paths: &DataPaths,
    opts: &PipelineOptions,
) -> anyhow::Result<PipelineReport> {
    let run_id = uuid::Uuid::new_v4();
    info!(
        %run_id,
        query = %opts.query,
        days = opts.days,
        ticker = %opts.ticker,
        data_dir = %paths.dir().display(),
        "=== starting market sentiment pipeline ==="
    );

    let fetched = fetch_stage(sources, paths, &opts.query, opts.days)
        .await
        .map_err(stage_error("fetch"))?;

    let (records, sentiment_path) = score_stage(scorer, paths).map_err(stage_error("score"))?;

    let correlation = correlate_stage(
        sources,
        paths,
        &records,
        &opts.ticker,
        opts.chart_path.clone(),
    )
    .await
    .map_err(stage_error("correlate"))?;

    info!(%run_id, articles = fetched.articles.len(), "pipeline finished");
    Ok(PipelineReport {
        run_id,
        news_source: fetched.source.to_string(),
        article_count: fetched.articles.len(),
        model_available: scorer.is_available(),
        sentiment_path,
        correlation,
    })
}

/// Runs the whole pipeline against the live services named in `settings`.
pub async fn run_full_pipeline(
    settings: &Settings,
    opts: &PipelineOptions,
) -> anyhow::Result<PipelineReport> {
    let clients = PipelineClients::from_settings(settings)?;
    let mut scorer = SentimentScorer::from_settings(settings);
    let paths = DataPaths::from_settings(settings);
    run_pipeline(clients.sources(), &mut scorer, &paths, opts).await
}
