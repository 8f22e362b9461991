use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

// Naive timestamps (no offset) are taken as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `publishedAt` value as written by either news source.
///
/// NewsAPI emits RFC 3339 (`2026-01-05T14:30:00Z`), RSS feeds emit RFC 2822
/// (`Mon, 05 Jan 2026 14:30:00 GMT`). Plain dates and naive timestamps are accepted
/// for hand-edited CSV files.
pub fn parse_published_at(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().with_timezone(&utc));
        }
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(&utc))
}

/// Calendar date of a `publishedAt` value, in the timestamp's own offset.
pub fn published_date(s: &str) -> Option<NaiveDate> {
    parse_published_at(s).map(|dt| dt.date_naive())
}

/// First day of a trailing window of `days` days ending on `today`.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_newsapi_rfc3339() {
        assert_eq!(published_date("2026-01-05T14:30:00Z"), Some(date(2026, 1, 5)));
    }

    #[test]
    fn parses_rss_rfc2822() {
        assert_eq!(
            published_date("Mon, 05 Jan 2026 23:10:00 GMT"),
            Some(date(2026, 1, 5))
        );
    }

    #[test]
    fn keeps_the_timestamps_own_offset() {
        // 01:00 on the 6th in UTC+9 is still the 6th, not the 5th in UTC.
        assert_eq!(
            published_date("2026-01-06T01:00:00+09:00"),
            Some(date(2026, 1, 6))
        );
    }

    #[test]
    fn accepts_naive_timestamps_and_plain_dates() {
        assert_eq!(published_date("2026-01-05 09:15:00"), Some(date(2026, 1, 5)));
        assert_eq!(published_date("2026-01-05"), Some(date(2026, 1, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(published_date(""), None);
        assert_eq!(published_date("yesterday"), None);
    }

    #[test]
    fn window_start_counts_back_whole_days() {
        assert_eq!(window_start(date(2026, 1, 5), 2), date(2026, 1, 3));
        assert_eq!(window_start(date(2026, 3, 1), 1), date(2026, 2, 28));
    }
}
