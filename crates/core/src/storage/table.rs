//! Read side used by the dashboard: whichever table the last run left behind.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Article, LabelCounts, SentimentRecord};
use crate::storage::news::read_news;
use crate::storage::sentiment::read_sentiment;
use crate::storage::DataPaths;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum LoadedTable {
    Sentiment(Vec<SentimentRecord>),
    News(Vec<Article>),
}

impl LoadedTable {
    pub fn len(&self) -> usize {
        match self {
            Self::Sentiment(rows) => rows.len(),
            Self::News(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most frequent `source` value; ties go to the name that sorts first.
    pub fn dominant_source(&self) -> Option<String> {
        let sources: Vec<&str> = match self {
            Self::Sentiment(rows) => rows.iter().map(|r| r.source.as_str()).collect(),
            Self::News(rows) => rows.iter().map(|r| r.source.as_str()).collect(),
        };

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for source in sources {
            *counts.entry(source).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by(|(a_name, a_n), (b_name, b_n)| a_n.cmp(b_n).then_with(|| b_name.cmp(a_name)))
            .map(|(name, _)| name.to_string())
    }

    /// Label tally; `None` for the news-only table.
    pub fn distribution(&self) -> Option<LabelCounts> {
        match self {
            Self::Sentiment(rows) => Some(rows.iter().map(|r| r.sentiment).collect()),
            Self::News(_) => None,
        }
    }
}

/// Sentiment table when present, else the raw news table, else `None`.
pub fn load_latest(paths: &DataPaths) -> anyhow::Result<Option<LoadedTable>> {
    if paths.sentiment().exists() {
        return read_sentiment(paths).map(|rows| Some(LoadedTable::Sentiment(rows)));
    }
    if paths.news().exists() {
        return read_news(paths).map(|rows| Some(LoadedTable::News(rows)));
    }
    Ok(None)
}
