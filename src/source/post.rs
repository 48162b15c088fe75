//! The normalised post record shared by the fetcher, the batch files and
//! the report.
//!
//! Every [`RemotePost`] is turned into a `PostRecord` at fetch time, with
//! its text cleaned once up front.  The sentiment label is filled in later
//! by the collection loop, right before the batch is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RemotePost;
use crate::clean::clean_text;
use crate::sentiment::Sentiment;

/// Legacy Twitter timestamp layout, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const TWITTER_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One row of a batch file.  Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// When the post was created, or when it was fetched if the service
    /// did not send a usable creation time.
    pub captured_at: DateTime<Utc>,
    pub raw_text: String,
    pub clean_text: String,
    pub author_handle: String,
    pub retweet_count: u64,
    pub like_count: u64,
    /// `None` until the collection loop labels the batch.
    pub sentiment: Option<Sentiment>,
}

impl PostRecord {
    /// Normalise a remote post fetched at `fetched_at`.
    pub fn from_remote(post: RemotePost, fetched_at: DateTime<Utc>) -> Self {
        let captured_at = post
            .created_at
            .as_deref()
            .and_then(parse_created_at)
            .unwrap_or(fetched_at);

        Self {
            captured_at,
            clean_text: clean_text(&post.text),
            raw_text: post.text,
            author_handle: post.screen_name,
            retweet_count: post.retweet_count,
            like_count: post.favorite_count,
            sentiment: None,
        }
    }
}

/// Accepts the legacy Twitter layout or RFC 3339.
fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, TWITTER_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn remote(created_at: Option<&str>) -> RemotePost {
        RemotePost {
            created_at: created_at.map(String::from),
            text: "Loving the @royalenfield Scram! https://t.co/x".to_string(),
            screen_name: "rider42".to_string(),
            retweet_count: 3,
            favorite_count: 17,
        }
    }

    #[test]
    fn normalises_fields_and_cleans_text() {
        let fetched = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = PostRecord::from_remote(remote(None), fetched);

        assert_eq!(record.raw_text, "Loving the @royalenfield Scram! https://t.co/x");
        assert_eq!(record.clean_text, "Loving the Scram");
        assert_eq!(record.author_handle, "rider42");
        assert_eq!(record.retweet_count, 3);
        assert_eq!(record.like_count, 17);
        assert!(record.sentiment.is_none());
    }

    #[test]
    fn parses_twitter_timestamp() {
        let fetched = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record =
            PostRecord::from_remote(remote(Some("Wed Oct 10 20:19:24 +0000 2018")), fetched);
        assert_eq!(
            record.captured_at,
            Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap()
        );
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        let fetched = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = PostRecord::from_remote(remote(Some("2024-12-05T08:00:00+01:00")), fetched);
        assert_eq!(
            record.captured_at,
            Utc.with_ymd_and_hms(2024, 12, 5, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn bad_timestamp_falls_back_to_fetch_time() {
        let fetched = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let record = PostRecord::from_remote(remote(Some("yesterday-ish")), fetched);
        assert_eq!(record.captured_at, fetched);
    }
}
