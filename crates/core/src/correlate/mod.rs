//! Daily sentiment aggregation joined against closing prices.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::chart::render_correlation_chart;
use crate::domain::{LabelCounts, LabelPercentages, PricePoint, Sentiment, SentimentRecord};
use crate::market::PriceSource;
use crate::time::published_date;

pub type DailySentimentCounts = BTreeMap<NaiveDate, LabelCounts>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub date: NaiveDate,
    pub close: f64,
    pub counts: LabelCounts,
    pub percentages: LabelPercentages,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Rendered { path: PathBuf, rows: usize },
    NothingToPlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub ticker: String,
    pub rows: Vec<CorrelationRow>,
    pub outcome: CorrelationOutcome,
}

/// Label counts per calendar date of `publishedAt`, in the timestamp's own offset.
pub fn daily_sentiment_counts(records: &[SentimentRecord]) -> DailySentimentCounts {
    let mut daily = DailySentimentCounts::new();
    let mut skipped = 0usize;
    for record in records {
        match published_date(&record.published_at) {
            Some(date) => daily.entry(date).or_default().add(record.sentiment),
            None => {
                skipped += 1;
                warn!(
                    published_at = %record.published_at,
                    title = %record.title,
                    "skipping record with unparseable publishedAt"
                );
            }
        }
    }
    if skipped > 0 {
        warn!(skipped, "records without a usable date were left out of daily counts");
    }
    daily
}

/// Labels with at least one headline on any day, in display order.
pub fn observed_labels(daily: &DailySentimentCounts) -> Vec<Sentiment> {
    Sentiment::DISPLAY_ORDER
        .into_iter()
        .filter(|label| daily.values().any(|counts| counts.get(*label) > 0))
        .collect()
}

/// One row per price date, in price order. Dates with headlines but no close are
/// dropped; closes with no headlines get zero counts.
pub fn join_prices_with_sentiment(
    prices: &[PricePoint],
    daily: &DailySentimentCounts,
) -> Vec<CorrelationRow> {
    prices
        .iter()
        .map(|p| {
            let counts = daily.get(&p.date).copied().unwrap_or_default();
            CorrelationRow {
                date: p.date,
                close: p.close,
                counts,
                percentages: counts.percentages(),
            }
        })
        .collect()
}

pub async fn correlate_with_stock(
    records: &[SentimentRecord],
    ticker: &str,
    prices: &dyn PriceSource,
    chart_path: &Path,
) -> anyhow::Result<CorrelationReport> {
    let daily = daily_sentiment_counts(records);

    let closes = prices
        .daily_closes(ticker)
        .await
        .with_context(|| format!("failed to fetch {ticker} prices from {}", prices.source_name()))?;
    info!(
        ticker,
        price_days = closes.len(),
        sentiment_days = daily.len(),
        "joining prices with daily sentiment"
    );

    let rows = join_prices_with_sentiment(&closes, &daily);
    let outcome = if rows.is_empty() {
        info!(ticker, "no price rows to plot, skipping chart");
        CorrelationOutcome::NothingToPlot
    } else {
        render_correlation_chart(&rows, &observed_labels(&daily), ticker, chart_path)?;
        info!(ticker, path = %chart_path.display(), rows = rows.len(), "saved correlation chart");
        CorrelationOutcome::Rendered {
            path: chart_path.to_path_buf(),
            rows: rows.len(),
        }
    };

    Ok(CorrelationReport {
        ticker: ticker.to_string(),
        rows,
        outcome,
    })
}
