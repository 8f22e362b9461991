use crate::config::Settings;
use crate::domain::PricePoint;
use crate::market::PriceSource;
use anyhow::{Context, Result};
use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const CHART_PATH: &str = "/v8/finance/chart";
const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (compatible; marketmood)";

// Trailing window used for correlation: five calendar days of daily bars.
const RANGE: &str = "5d";
const INTERVAL: &str = "1d";

#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .default_headers(headers)
            .build()
            .context("failed to build Yahoo chart http client")?;

        Ok(Self {
            http,
            base_url: settings
                .yahoo_chart_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn url(&self, ticker: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            CHART_PATH,
            ticker
        )
    }
}

#[async_trait::async_trait]
impl PriceSource for YahooChartClient {
    fn source_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn daily_closes(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        anyhow::ensure!(!ticker.trim().is_empty(), "ticker must be non-empty");

        let res = self
            .http
            .get(self.url(ticker.trim()))
            .query(&[("range", RANGE), ("interval", INTERVAL)])
            .send()
            .await
            .context("Yahoo chart request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Yahoo chart response")?;

        // Yahoo reports unknown symbols as a 404 with a JSON error body.
        let envelope = serde_json::from_str::<ChartEnvelope>(&text);
        if !status.is_success() {
            let detail = envelope
                .ok()
                .and_then(|e| e.chart)
                .and_then(|c| c.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or(text);
            anyhow::bail!("Yahoo chart HTTP {status} for {ticker}: {detail}");
        }

        let envelope = envelope.context("failed to parse Yahoo chart response")?;
        closes_from_chart(envelope, ticker)
    }
}

/// Daily closes keyed by the exchange-local date.
///
/// Bars without a close are skipped. When Yahoo appends a live bar for a day that
/// already has a bar, the later one wins.
fn closes_from_chart(envelope: ChartEnvelope, ticker: &str) -> Result<Vec<PricePoint>> {
    let chart = envelope.chart.context("Yahoo chart response has no chart node")?;
    if let Some(err) = chart.error {
        anyhow::bail!("Yahoo chart error for {ticker}: {}: {}", err.code, err.description);
    }

    let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let gmtoffset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut by_date = BTreeMap::new();
    for (ts, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + gmtoffset, 0)
            .with_context(|| format!("invalid bar timestamp {ts}"))?
            .date_naive();
        by_date.insert(date, close);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartNode>,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<MetaNode>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct MetaNode {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::Method::GET;
    use httpmock::MockServer;

    // 2026-01-05..07 14:30 UTC (09:30 New York), gmtoffset -18000.
    const CHART: &str = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "AAPL", "timezone": "EST", "gmtoffset": -18000},
          "timestamp": [1767623400, 1767709800, 1767796200],
          "indicators": {
            "quote": [{"open": [1, 2, 3], "close": [243.1, null, 245.5], "volume": [10, 20, 30]}],
            "adjclose": [{"adjclose": [243.1, null, 245.5]}]
          }
        }],
        "error": null
      }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client_for(server: &MockServer) -> YahooChartClient {
        let base_url = server.base_url();
        let settings = Settings::from_lookup(move |k| {
            (k == "YAHOO_CHART_BASE_URL").then(|| base_url.clone())
        })
        .unwrap();
        YahooChartClient::from_settings(&settings).unwrap()
    }

    #[test]
    fn skips_missing_closes_and_uses_exchange_dates() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART).unwrap();
        let points = closes_from_chart(envelope, "AAPL").unwrap();
        assert_eq!(
            points,
            vec![
                PricePoint {
                    date: date(2026, 1, 5),
                    close: 243.1
                },
                PricePoint {
                    date: date(2026, 1, 7),
                    close: 245.5
                },
            ]
        );
    }

    #[test]
    fn later_bar_wins_for_the_same_day() {
        let body = r#"{"chart": {"result": [{
            "meta": {"gmtoffset": 0},
            "timestamp": [1767623400, 1767640000],
            "indicators": {"quote": [{"close": [100.0, 101.5]}]}
        }], "error": null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let points = closes_from_chart(envelope, "AAPL").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].close, 101.5);
    }

    #[test]
    fn chart_error_node_is_an_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(body).unwrap();
        let err = closes_from_chart(envelope, "NOPE").unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[tokio::test]
    async fn requests_five_day_daily_window() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v8/finance/chart/AAPL")
                .query_param("range", "5d")
                .query_param("interval", "1d");
            then.status(200)
                .header("content-type", "application/json")
                .body(CHART);
        });

        let points = client_for(&server).daily_closes("AAPL").await.unwrap();
        mock.assert();
        assert_eq!(points.len(), 2);
    }

    #[tokio::test]
    async fn not_found_carries_yahoo_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v8/finance/chart/NOPE");
            then.status(404).body(
                r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#,
            );
        });

        let err = client_for(&server).daily_closes("NOPE").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("404"), "{msg}");
        assert!(msg.contains("No data found"), "{msg}");
    }
}
