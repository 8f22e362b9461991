pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::domain::{Article, SentimentRecord};
use crate::sentiment::SentimentScorer;
use crate::storage::news::read_news;
use crate::storage::sentiment::write_sentiment;
use crate::storage::DataPaths;

pub use run::{run_full_pipeline, PipelineOptions, PipelineReport, PipelineStageError};

/// Labels each headline by its title. Output order matches input order.
pub fn score_articles(scorer: &mut SentimentScorer, articles: &[Article]) -> Vec<SentimentRecord> {
    articles
        .iter()
        .map(|article| {
            let label = scorer.predict(Some(&article.title));
            SentimentRecord::from_article(article.clone(), label)
        })
        .collect()
}

/// Reads `news.csv`, scores it and overwrites `sentiment_results.csv`.
pub fn run_sentiment_pipeline(
    scorer: &mut SentimentScorer,
    paths: &DataPaths,
) -> anyhow::Result<(Vec<SentimentRecord>, PathBuf)> {
    let articles = read_news(paths).context("no news table to score; fetch news first")?;
    let records = score_articles(scorer, &articles);
    let path = write_sentiment(paths, &records)?;
    info!(
        rows = records.len(),
        model = scorer.is_available(),
        "sentiment analysis complete"
    );
    Ok((records, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sentiment;
    use crate::storage::news::write_news;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: Some("body".to_string()),
            url: None,
            published_at: "2026-01-05T14:30:00Z".to_string(),
            source: "newsapi".to_string(),
        }
    }

    #[test]
    fn scores_titles_in_order() {
        let mut scorer = SentimentScorer::heuristic_only();
        let records = score_articles(
            &mut scorer,
            &[
                article("Shares drop after weak guidance"),
                article("Fed holds rates"),
                article("Company reports record growth and strong gain"),
            ],
        );
        assert_eq!(
            records.iter().map(|r| r.sentiment).collect::<Vec<_>>(),
            vec![Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive]
        );
        assert_eq!(records[0].title, "Shares drop after weak guidance");
    }

    #[test]
    fn rerunning_on_the_same_news_gives_the_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        write_news(
            &paths,
            &[article("Tech stocks surge"), article("Oil prices fall")],
        )
        .unwrap();

        let mut scorer = SentimentScorer::heuristic_only();
        let (first, path) = run_sentiment_pipeline(&mut scorer, &paths).unwrap();
        let first_bytes = std::fs::read(&path).unwrap();
        let (second, _) = run_sentiment_pipeline(&mut scorer, &paths).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), first_bytes);
    }

    #[test]
    fn missing_news_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut scorer = SentimentScorer::heuristic_only();
        let err = run_sentiment_pipeline(&mut scorer, &DataPaths::new(dir.path())).unwrap_err();
        assert!(format!("{err:#}").contains("fetch news first"));
    }
}
