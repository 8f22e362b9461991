pub mod news;
pub mod sentiment;
pub mod table;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;

pub const NEWS_FILE: &str = "news.csv";
pub const SENTIMENT_FILE: &str = "sentiment_results.csv";

/// File layout of one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    dir: PathBuf,
}

impl DataPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.data_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn news(&self) -> PathBuf {
        self.dir.join(NEWS_FILE)
    }

    pub fn sentiment(&self) -> PathBuf {
        self.dir.join(SENTIMENT_FILE)
    }

    pub fn chart(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}_sentiment_vs_price.svg"))
    }

    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create data dir {}", self.dir.display()))
    }
}

/// Writes `bytes` next to `path` and renames over it, so readers never see a
/// half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("failed to move {} into place", path.display()));
    }
    Ok(())
}

/// Header row is written explicitly so an empty table still has one.
pub(crate) fn write_csv<T: Serialize>(
    path: &Path,
    headers: &[&str],
    rows: &[T],
) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to encode row for {}", path.display()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush csv buffer: {e}"))?;
    write_atomic(path, &bytes)
}

pub(crate) fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("{}: bad row {}", path.display(), i + 1)))
        .collect()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_the_data_dir() {
        let paths = DataPaths::new("data");
        assert_eq!(paths.news(), PathBuf::from("data/news.csv"));
        assert_eq!(paths.sentiment(), PathBuf::from("data/sentiment_results.csv"));
        assert_eq!(
            paths.chart("AAPL"),
            PathBuf::from("data/AAPL_sentiment_vs_price.svg")
        );
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn empty_table_still_has_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv::<(String,)>(&path, &["title"], &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "title\n");
    }
}
