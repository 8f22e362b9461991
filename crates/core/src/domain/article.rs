use crate::domain::sentiment::Sentiment;
use serde::{Deserialize, Serialize};

/// One news headline as returned by a news source, persisted as a row of `news.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub source: String,
}

impl Article {
    pub const CSV_HEADERS: [&'static str; 5] =
        ["title", "description", "url", "publishedAt", "source"];
}

/// An [`Article`] plus its derived label; a row of `sentiment_results.csv`.
///
/// Kept flat (no nested `Article`) because CSV rows cannot carry nested records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub source: String,
    pub sentiment: Sentiment,
}

impl SentimentRecord {
    pub const CSV_HEADERS: [&'static str; 6] = [
        "title",
        "description",
        "url",
        "publishedAt",
        "source",
        "sentiment",
    ];

    pub fn from_article(article: Article, sentiment: Sentiment) -> Self {
        Self {
            title: article.title,
            description: article.description,
            url: article.url,
            published_at: article.published_at,
            source: article.source,
            sentiment,
        }
    }
}
