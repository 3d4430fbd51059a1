//! Raw entry to `VideoRecord` normalization
//!
//! Entries missing an id, snippet, or parseable publish timestamp are
//! skipped with a log entry. Everything else gets safe defaults: unknown
//! channel metadata becomes the `"unknown"` sentinel with a zero subscriber
//! count, and unparseable string-encoded counts become zero rather than
//! propagating.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::{VideoCategory, VideoRecord};
use crate::sources::types::{RawChannel, RawVideo};
use crate::utils::datetime;

/// Sentinel channel title used when the channel lookup misses.
pub const UNKNOWN_CHANNEL: &str = "unknown";

/// Normalize one raw entry into a `VideoRecord`, or `None` when the entry
/// fails validation.
pub fn normalize(
    raw: &RawVideo,
    channels: &HashMap<String, RawChannel>,
    hashtag: &str,
    fetched_at: DateTime<Utc>,
) -> Option<VideoRecord> {
    if raw.id.is_empty() {
        warn!(hashtag, "Skipping entry without a video id");
        return None;
    }

    let snippet = match raw.snippet.as_ref() {
        Some(snippet) => snippet,
        None => {
            warn!(hashtag, video_id = %raw.id, "Skipping entry without snippet metadata");
            return None;
        }
    };

    let published_at = match snippet
        .published_at
        .as_deref()
        .map(datetime::parse_flexible)
    {
        Some(Ok(dt)) => dt,
        Some(Err(e)) => {
            warn!(hashtag, video_id = %raw.id, error = %e, "Skipping entry with unparseable publish timestamp");
            return None;
        }
        None => {
            warn!(hashtag, video_id = %raw.id, "Skipping entry without publish timestamp");
            return None;
        }
    };

    let channel = snippet
        .channel_id
        .as_deref()
        .and_then(|id| channels.get(id));
    let channel_title = channel
        .and_then(|c| c.title.clone())
        .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string());
    let subscriber_count = parse_count(channel.and_then(|c| c.subscriber_count.as_deref()));

    let stats = raw.statistics.as_ref();
    let view_count = parse_count(stats.and_then(|s| s.view_count.as_deref()));
    let like_count = parse_count(stats.and_then(|s| s.like_count.as_deref()));
    let comment_count = parse_count(stats.and_then(|s| s.comment_count.as_deref()));

    Some(VideoRecord {
        fetched_at,
        hashtag: hashtag.to_string(),
        video_id: raw.id.clone(),
        category: classify(&snippet.title, &snippet.description),
        title: snippet.title.clone(),
        url: video_url(&raw.id),
        channel_title,
        subscriber_count,
        published_at,
        description: snippet.description.clone(),
        view_count,
        like_count,
        comment_count,
    })
}

/// Fixed textual heuristic: a video is a short when the literal `#shorts`
/// marker, or `shorts` in any casing, appears in the title or description.
pub fn classify(title: &str, description: &str) -> VideoCategory {
    if title.contains("#shorts") || description.contains("#shorts") {
        return VideoCategory::Short;
    }
    let title_lower = title.to_lowercase();
    let description_lower = description.to_lowercase();
    if title_lower.contains("shorts") || description_lower.contains("shorts") {
        VideoCategory::Short
    } else {
        VideoCategory::Regular
    }
}

/// Watch URL derived deterministically from the video id.
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// String-encoded counts default to 0 when absent or non-numeric.
fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::types::{RawSnippet, RawStatistics};
    use chrono::TimeZone;

    fn raw_video(id: &str, title: &str, description: &str) -> RawVideo {
        RawVideo {
            id: id.to_string(),
            snippet: Some(RawSnippet {
                published_at: Some("2023-06-01T10:00:00Z".to_string()),
                channel_id: Some("chan1".to_string()),
                title: title.to_string(),
                description: description.to_string(),
            }),
            statistics: Some(RawStatistics {
                view_count: Some("100".to_string()),
                like_count: Some("10".to_string()),
                comment_count: None,
                subscriber_count: None,
            }),
        }
    }

    fn channels() -> HashMap<String, RawChannel> {
        let mut map = HashMap::new();
        map.insert(
            "chan1".to_string(),
            RawChannel {
                title: Some("Test Channel".to_string()),
                subscriber_count: Some("5000".to_string()),
            },
        );
        map
    }

    fn fetched_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn normalizes_complete_entry() {
        let raw = raw_video("vid1", "My video", "a description");
        let record = normalize(&raw, &channels(), "#testtag", fetched_at()).unwrap();
        assert_eq!(record.video_id, "vid1");
        assert_eq!(record.hashtag, "#testtag");
        assert_eq!(record.channel_title, "Test Channel");
        assert_eq!(record.subscriber_count, 5000);
        assert_eq!(record.view_count, 100);
        assert_eq!(record.like_count, 10);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.url, "https://www.youtube.com/watch?v=vid1");
        assert_eq!(record.category, VideoCategory::Regular);
    }

    #[test]
    fn skips_entry_without_id() {
        let raw = raw_video("", "title", "desc");
        assert!(normalize(&raw, &channels(), "#t", fetched_at()).is_none());
    }

    #[test]
    fn skips_entry_without_snippet() {
        let mut raw = raw_video("vid1", "title", "desc");
        raw.snippet = None;
        assert!(normalize(&raw, &channels(), "#t", fetched_at()).is_none());
    }

    #[test]
    fn skips_entry_without_publish_timestamp() {
        let mut raw = raw_video("vid1", "title", "desc");
        raw.snippet.as_mut().unwrap().published_at = None;
        assert!(normalize(&raw, &channels(), "#t", fetched_at()).is_none());
    }

    #[test]
    fn channel_lookup_miss_defaults_to_sentinel() {
        let raw = raw_video("vid1", "title", "desc");
        let record = normalize(&raw, &HashMap::new(), "#t", fetched_at()).unwrap();
        assert_eq!(record.channel_title, UNKNOWN_CHANNEL);
        assert_eq!(record.subscriber_count, 0);
    }

    #[test]
    fn non_numeric_counts_default_to_zero() {
        let mut raw = raw_video("vid1", "title", "desc");
        raw.statistics.as_mut().unwrap().view_count = Some("not-a-number".to_string());
        let record = normalize(&raw, &channels(), "#t", fetched_at()).unwrap();
        assert_eq!(record.view_count, 0);
    }

    #[test]
    fn shorts_marker_in_title_classifies_short() {
        assert_eq!(classify("funny cat #shorts", ""), VideoCategory::Short);
        assert_eq!(classify("", "watch my #shorts feed"), VideoCategory::Short);
        assert_eq!(classify("My SHORTS compilation", ""), VideoCategory::Short);
    }

    #[test]
    fn no_marker_classifies_regular() {
        assert_eq!(classify("a full length video", "longform"), VideoCategory::Regular);
    }
}
