use std::path::PathBuf;

use tracing::info;

use crate::domain::SentimentRecord;
use crate::storage::{read_csv, write_csv, DataPaths};

pub fn write_sentiment(paths: &DataPaths, records: &[SentimentRecord]) -> anyhow::Result<PathBuf> {
    paths.ensure_dir()?;
    let path = paths.sentiment();
    write_csv(&path, &SentimentRecord::CSV_HEADERS, records)?;
    info!(rows = records.len(), path = %path.display(), "wrote sentiment table");
    Ok(path)
}

pub fn read_sentiment(paths: &DataPaths) -> anyhow::Result<Vec<SentimentRecord>> {
    read_csv(&paths.sentiment())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sentiment;

    #[test]
    fn labels_are_stored_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let records = vec![SentimentRecord {
            title: "Shares drop".to_string(),
            description: None,
            url: None,
            published_at: "Mon, 05 Jan 2026 14:30:00 GMT".to_string(),
            source: "google_rss".to_string(),
            sentiment: Sentiment::Negative,
        }];

        write_sentiment(&paths, &records).unwrap();

        let raw = std::fs::read_to_string(paths.sentiment()).unwrap();
        assert!(raw.lines().nth(1).unwrap().ends_with(",google_rss,Negative"));
        assert_eq!(read_sentiment(&paths).unwrap(), records);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        std::fs::write(
            paths.sentiment(),
            "title,description,url,publishedAt,source,sentiment\nx,,,2026-01-05,newsapi,Bullish\n",
        )
        .unwrap();
        assert!(read_sentiment(&paths).is_err());
    }
}
