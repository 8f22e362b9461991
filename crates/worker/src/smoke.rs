use anyhow::Context;

use marketmood_core::pipeline::run::{fetch_stage, PipelineSources, DEFAULT_QUERY};
use marketmood_core::storage::news::read_news;
use marketmood_core::storage::DataPaths;

const SMOKE_DAYS: u32 = 1;

#[derive(Debug)]
pub struct SmokeReport {
    pub source: &'static str,
    pub rows: usize,
}

/// Fetches one day of news and checks that `news.csv` landed on disk.
pub async fn run_smoke(sources: PipelineSources<'_>, paths: &DataPaths) -> anyhow::Result<SmokeReport> {
    let fetched = fetch_stage(sources, paths, DEFAULT_QUERY, SMOKE_DAYS)
        .await
        .context("smoke test: news fetch failed")?;

    let news_path = paths.news();
    anyhow::ensure!(
        news_path.exists(),
        "smoke test: {} was not written",
        news_path.display()
    );
    let rows = read_news(paths)
        .context("smoke test: news.csv is unreadable")?
        .len();

    tracing::info!(source = fetched.source, rows, path = %news_path.display(), "smoke test passed");
    Ok(SmokeReport {
        source: fetched.source,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketmood_core::domain::{Article, PricePoint};
    use marketmood_core::ingest::NewsSource;
    use marketmood_core::market::PriceSource;
    use std::sync::Mutex;

    struct RecordingNews {
        articles: Vec<Article>,
        seen: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait::async_trait]
    impl NewsSource for RecordingNews {
        fn source_name(&self) -> &'static str {
            "google_rss"
        }

        async fn fetch_articles(&self, query: &str, days: u32) -> anyhow::Result<Vec<Article>> {
            self.seen.lock().unwrap().push((query.to_string(), days));
            Ok(self.articles.clone())
        }
    }

    struct NoPrices;

    #[async_trait::async_trait]
    impl PriceSource for NoPrices {
        fn source_name(&self) -> &'static str {
            "none"
        }

        async fn daily_closes(&self, _ticker: &str) -> anyhow::Result<Vec<PricePoint>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn fetches_one_day_and_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let news = RecordingNews {
            articles: vec![Article {
                title: "Markets open higher".to_string(),
                description: None,
                url: None,
                published_at: "2026-01-05T14:30:00Z".to_string(),
                source: "google_rss".to_string(),
            }],
            seen: Mutex::new(Vec::new()),
        };
        let sources = PipelineSources {
            news_primary: None,
            news_fallback: &news,
            prices: &NoPrices,
        };

        let report = run_smoke(sources, &paths).await.unwrap();

        assert_eq!(report.rows, 1);
        assert_eq!(report.source, "google_rss");
        assert_eq!(
            news.seen.lock().unwrap().as_slice(),
            &[("stock market".to_string(), 1)]
        );
        assert!(paths.news().exists());
    }
}
