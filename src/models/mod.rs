//! Core record types shared across the pipeline
//!
//! These are the normalized, named-field shapes that flow between the source
//! layer, the pipeline stages, and the repositories. Raw provider payloads
//! never leave the `sources` module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a video, derived from a textual heuristic at
/// normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCategory {
    Short,
    Regular,
}

impl VideoCategory {
    /// All categories, in the order stat rows are emitted.
    pub const ALL: [VideoCategory; 2] = [VideoCategory::Regular, VideoCategory::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCategory::Short => "short",
            VideoCategory::Regular => "regular",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "short" => Some(VideoCategory::Short),
            "regular" => Some(VideoCategory::Regular),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized row of collected video data.
///
/// `video_id` is the dedup key and is guaranteed non-empty by the
/// normalizer. `fetched_at` is stamped once per run and shared by every
/// record that run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub fetched_at: DateTime<Utc>,
    pub hashtag: String,
    pub video_id: String,
    pub category: VideoCategory,
    pub title: String,
    pub url: String,
    pub channel_title: String,
    pub subscriber_count: u64,
    pub published_at: DateTime<Utc>,
    pub description: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// A `VideoRecord` as persisted, carrying its surrogate row id.
///
/// The id is what the day-scoped dedup hands back for in-place deletion of
/// superseded rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVideoRecord {
    pub id: i64,
    pub record: VideoRecord,
}

/// Per-day, per-hashtag, per-category aggregate.
///
/// Zero-match combinations still produce a row with all counters at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatRow {
    pub date: String,
    pub hashtag: String,
    pub category: VideoCategory,
    pub video_count: u64,
    pub channel_count: u64,
    pub total_views: u64,
}

/// One dated per-channel snapshot appended to the subscriber history log.
///
/// `subscriber_count` is the maximum observed across the main table at
/// snapshot time; `view_count` is the sum over that channel's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub date: DateTime<Utc>,
    pub channel_title: String,
    pub subscriber_count: u64,
    pub view_count: u64,
}

/// Outcome of processing a single hashtag within a run.
#[derive(Debug, Clone, Serialize)]
pub struct TagOutcome {
    pub hashtag: String,
    /// Raw entries returned by the provider (pre-normalization).
    pub fetched: usize,
    /// Rows appended to the store after normalization.
    pub appended: usize,
    /// Present when the tag's fetch or append failed; the run continued
    /// with the remaining tags.
    pub error: Option<String>,
}

impl TagOutcome {
    pub fn failed(hashtag: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            hashtag: hashtag.into(),
            fetched: 0,
            appended: 0,
            error: Some(error.into()),
        }
    }
}

/// Report for the full-sync and daily-incremental workflows.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<TagOutcome>,
    /// Superseded rows removed by the dedup stage.
    pub duplicates_removed: usize,
}

impl SyncReport {
    pub fn total_appended(&self) -> usize {
        self.outcomes.iter().map(|o| o.appended).sum()
    }

    pub fn failed_tags(&self) -> impl Iterator<Item = &TagOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

/// Report for a daily statistics computation.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub date: String,
    pub rows: Vec<DailyStatRow>,
    pub outcomes: Vec<TagOutcome>,
}

/// Report for a subscriber-history update.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub date: DateTime<Utc>,
    pub channels: usize,
    pub source_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_storage_string() {
        for category in VideoCategory::ALL {
            assert_eq!(
                VideoCategory::from_str_opt(category.as_str()),
                Some(category)
            );
        }
        assert_eq!(VideoCategory::from_str_opt("music"), None);
    }

    #[test]
    fn sync_report_sums_appended_rows() {
        let report = SyncReport {
            outcomes: vec![
                TagOutcome {
                    hashtag: "#a".into(),
                    fetched: 5,
                    appended: 4,
                    error: None,
                },
                TagOutcome::failed("#b", "quota exceeded"),
            ],
            duplicates_removed: 1,
        };
        assert_eq!(report.total_appended(), 4);
        assert_eq!(report.failed_tags().count(), 1);
    }
}
