use crate::config::Settings;
use crate::domain::Article;
use crate::ingest::provider::NewsSource;
use crate::ingest::types::EverythingResponse;
use crate::time::window_start;
use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const EVERYTHING_PATH: &str = "/v2/everything";
pub const SOURCE_NAME: &str = "newsapi";

/// Keyed NewsAPI search. Constructible without a key so the missing credential
/// surfaces as a fetch error and triggers the fallback like any other failure.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build NewsAPI http client")?;

        Ok(Self {
            http,
            base_url: settings
                .newsapi_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: settings.newsapi_key.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), EVERYTHING_PATH)
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiClient {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_articles(&self, query: &str, days: u32) -> Result<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("NEWSAPI_KEY is not set")?;
        let from = window_start(chrono::Local::now().date_naive(), days).to_string();

        let res = self
            .http
            .get(self.url())
            .query(&[
                ("q", query),
                ("language", "en"),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .context("NewsAPI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read NewsAPI response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<EverythingResponse>(&text)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(text);
            anyhow::bail!("NewsAPI HTTP {status}: {detail}");
        }

        parse_everything(&text)
    }
}

fn parse_everything(text: &str) -> Result<Vec<Article>> {
    let parsed = serde_json::from_str::<EverythingResponse>(text)
        .context("failed to parse NewsAPI response")?;

    if parsed.status.as_deref() == Some("error") {
        anyhow::bail!(
            "NewsAPI error {}: {}",
            parsed.code.unwrap_or_default(),
            parsed.message.unwrap_or_default()
        );
    }

    Ok(parsed
        .articles
        .into_iter()
        .map(|a| a.into_article(SOURCE_NAME))
        .collect())
}
