pub mod chart;
pub mod correlate;
pub mod domain;
pub mod ingest;
pub mod market;
pub mod pipeline;
pub mod sentiment;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_DATA_DIR: &str = "data";
    const DEFAULT_MODEL_DIR: &str = "models/finbert-tone";
    const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

    // Left in .env templates; treated the same as an unset key.
    const NEWSAPI_KEY_PLACEHOLDER: &str = "YOUR_NEWSAPI_KEY";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub newsapi_key: Option<String>,
        pub newsapi_base_url: Option<String>,
        pub google_news_base_url: Option<String>,
        pub yahoo_chart_base_url: Option<String>,
        pub http_timeout_secs: u64,
        pub data_dir: PathBuf,
        pub model_dir: PathBuf,
        pub auto_run: bool,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup so callers (and tests) do not
        /// have to mutate the process environment.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

            let newsapi_key =
                non_empty("NEWSAPI_KEY").filter(|k| k.trim() != NEWSAPI_KEY_PLACEHOLDER);

            let http_timeout_secs = match non_empty("HTTP_TIMEOUT_SECS") {
                Some(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS must be an integer (got {s})"))?,
                None => DEFAULT_HTTP_TIMEOUT_SECS,
            };

            Ok(Self {
                newsapi_key,
                newsapi_base_url: non_empty("NEWSAPI_BASE_URL"),
                google_news_base_url: non_empty("GOOGLE_NEWS_BASE_URL"),
                yahoo_chart_base_url: non_empty("YAHOO_CHART_BASE_URL"),
                http_timeout_secs,
                data_dir: non_empty("MARKETMOOD_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
                model_dir: non_empty("FINBERT_MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR)),
                auto_run: non_empty("MARKETMOOD_AUTO_RUN")
                    .map(|s| parse_flag(&s))
                    .unwrap_or(false),
                sentry_dsn: non_empty("SENTRY_DSN"),
            })
        }

        pub fn require_newsapi_key(&self) -> anyhow::Result<&str> {
            self.newsapi_key
                .as_deref()
                .context("NEWSAPI_KEY is required")
        }

        pub fn http_timeout(&self) -> std::time::Duration {
            std::time::Duration::from_secs(self.http_timeout_secs)
        }
    }

    fn parse_flag(s: &str) -> bool {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|k| map.get(k).cloned())
        }

        #[test]
        fn defaults_when_nothing_is_set() {
            let s = settings_from(&[]).unwrap();
            assert!(s.newsapi_key.is_none());
            assert_eq!(s.http_timeout_secs, 15);
            assert_eq!(s.data_dir, PathBuf::from("data"));
            assert_eq!(s.model_dir, PathBuf::from("models/finbert-tone"));
            assert!(!s.auto_run);
            assert!(s.require_newsapi_key().is_err());
        }

        #[test]
        fn placeholder_key_counts_as_missing() {
            let s = settings_from(&[("NEWSAPI_KEY", "YOUR_NEWSAPI_KEY")]).unwrap();
            assert!(s.newsapi_key.is_none());

            let s = settings_from(&[("NEWSAPI_KEY", "abc123")]).unwrap();
            assert_eq!(s.require_newsapi_key().unwrap(), "abc123");
        }

        #[test]
        fn parses_auto_run_flag_and_timeout() {
            let s = settings_from(&[("MARKETMOOD_AUTO_RUN", "TRUE"), ("HTTP_TIMEOUT_SECS", "10")])
                .unwrap();
            assert!(s.auto_run);
            assert_eq!(s.http_timeout_secs, 10);

            let s = settings_from(&[("MARKETMOOD_AUTO_RUN", "0")]).unwrap();
            assert!(!s.auto_run);

            assert!(settings_from(&[("HTTP_TIMEOUT_SECS", "soon")]).is_err());
        }
    }
}
