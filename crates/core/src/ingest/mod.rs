pub mod google_rss;
pub mod newsapi;
pub mod provider;
pub mod types;

pub use provider::{fetch_with_fallback, FetchedNews, NewsFetchError, NewsSource};
