use crate::config::Settings;
use crate::domain::Article;
use crate::ingest::provider::NewsSource;
use crate::ingest::types::RssDocument;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

const DEFAULT_BASE_URL: &str = "https://news.google.com";
const SEARCH_PATH: &str = "/rss/search";
const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (compatible; marketmood)";
pub const SOURCE_NAME: &str = "google_rss";

/// Keyless Google News search feed.
#[derive(Debug, Clone)]
pub struct GoogleRssClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleRssClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .default_headers(headers)
            .build()
            .context("failed to build Google News http client")?;

        Ok(Self {
            http,
            base_url: settings
                .google_news_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

#[async_trait::async_trait]
impl NewsSource for GoogleRssClient {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_articles(&self, query: &str, days: u32) -> Result<Vec<Article>> {
        // The feed has no date parameter; the `when:` operator limits recency.
        let q = format!("{query} when:{days}d");

        let res = self
            .http
            .get(self.url())
            .query(&[
                ("q", q.as_str()),
                ("hl", "en-US"),
                ("gl", "US"),
                ("ceid", "US:en"),
            ])
            .send()
            .await
            .context("Google News RSS request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Google News RSS response")?;
        anyhow::ensure!(status.is_success(), "Google News RSS HTTP {status}");

        parse_feed(&text)
    }
}

pub fn parse_feed(xml: &str) -> Result<Vec<Article>> {
    let doc: RssDocument =
        quick_xml::de::from_str(xml).context("failed to parse Google News RSS feed")?;

    Ok(doc
        .channel
        .items
        .into_iter()
        .map(|item| item.into_article(SOURCE_NAME))
        .collect())
}
