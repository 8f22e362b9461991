use crate::domain::Article;
use anyhow::Result;
use std::fmt;

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Tag written to the `source` column of every article this source returns.
    fn source_name(&self) -> &'static str;

    async fn fetch_articles(&self, query: &str, days: u32) -> Result<Vec<Article>>;
}

#[derive(Debug, Clone)]
pub struct FetchedNews {
    pub source: &'static str,
    pub articles: Vec<Article>,
}

/// Both news sources failed. Carries the reason from each attempt.
#[derive(Debug, Clone)]
pub struct NewsFetchError {
    pub primary: Option<(&'static str, String)>,
    pub fallback: (&'static str, String),
}

impl fmt::Display for NewsFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to fetch news")?;
        if let Some((name, reason)) = &self.primary {
            write!(f, " ({name}: {reason})")?;
        }
        write!(f, " ({}: {})", self.fallback.0, self.fallback.1)
    }
}

impl std::error::Error for NewsFetchError {}

/// Tries `primary` once, then `fallback` once.
///
/// The primary source is abandoned on any error or on an empty result. An empty
/// result from the fallback is returned as-is.
pub async fn fetch_with_fallback(
    primary: Option<&dyn NewsSource>,
    fallback: &dyn NewsSource,
    query: &str,
    days: u32,
) -> Result<FetchedNews> {
    let mut primary_failure = None;

    if let Some(source) = primary {
        let name = source.source_name();
        match source.fetch_articles(query, days).await {
            Ok(articles) if !articles.is_empty() => {
                tracing::info!(source = name, count = articles.len(), "fetched news articles");
                return Ok(FetchedNews {
                    source: name,
                    articles,
                });
            }
            Ok(_) => {
                tracing::warn!(
                    source = name,
                    fallback = fallback.source_name(),
                    "news source returned no articles; falling back"
                );
                primary_failure = Some((name, "returned no articles".to_string()));
            }
            Err(err) => {
                tracing::warn!(
                    source = name,
                    fallback = fallback.source_name(),
                    error = %err,
                    "news fetch failed; falling back"
                );
                primary_failure = Some((name, format!("{err:#}")));
            }
        }
    }

    let name = fallback.source_name();
    match fallback.fetch_articles(query, days).await {
        Ok(articles) => {
            tracing::info!(source = name, count = articles.len(), "fetched news articles");
            Ok(FetchedNews {
                source: name,
                articles,
            })
        }
        Err(err) => Err(NewsFetchError {
            primary: primary_failure,
            fallback: (name, format!("{err:#}")),
        }
        .into()),
    }
}
