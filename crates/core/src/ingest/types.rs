use crate::domain::Article;
use serde::Deserialize;

/// `GET /v2/everything` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct EverythingResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl NewsApiArticle {
    pub fn into_article(self, source: &str) -> Article {
        Article {
            title: self.title.unwrap_or_default(),
            description: self.description,
            url: self.url,
            published_at: self.published_at.unwrap_or_default(),
            source: source.to_string(),
        }
    }
}

/// `<rss><channel><item>...</item></channel></rss>`; everything but the items is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RssDocument {
    pub channel: RssChannel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssChannel {
    #[serde(rename = "item", default)]
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

impl RssItem {
    pub fn into_article(self, source: &str) -> Article {
        Article {
            title: self.title.unwrap_or_default(),
            description: self.description,
            url: self.link,
            published_at: self.pub_date.unwrap_or_default(),
            source: source.to_string(),
        }
    }
}
