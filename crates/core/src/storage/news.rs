use std::path::PathBuf;

use tracing::info;

use crate::domain::Article;
use crate::storage::{read_csv, write_csv, DataPaths};

pub fn write_news(paths: &DataPaths, articles: &[Article]) -> anyhow::Result<PathBuf> {
    paths.ensure_dir()?;
    let path = paths.news();
    write_csv(&path, &Article::CSV_HEADERS, articles)?;
    info!(rows = articles.len(), path = %path.display(), "wrote news table");
    Ok(path)
}

pub fn read_news(paths: &DataPaths) -> anyhow::Result<Vec<Article>> {
    read_csv(&paths.news())
}
