pub mod article;
pub mod price;
pub mod sentiment;

pub use article::{Article, SentimentRecord};
pub use price::PricePoint;
pub use sentiment::{LabelCounts, LabelPercentages, Sentiment};
