pub mod published;

pub use published::{parse_published_at, published_date, window_start};
