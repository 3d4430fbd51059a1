//! Most-recent-wins deduplication keyed by video id
//!
//! Rows fetched repeatedly across runs collapse to the row with the latest
//! `fetched_at`; ties resolve to the first-seen row in input order (stable
//! sort). Applying the pass twice yields the same result as once.

use std::collections::HashSet;

use crate::models::{StoredVideoRecord, VideoRecord};
use crate::utils::time::DayWindow;

#[derive(Debug, Clone)]
pub struct DedupeOutcome {
    pub kept: Vec<VideoRecord>,
    /// Input size minus output size.
    pub removed: usize,
}

/// Collapse `records` so that each `video_id` appears once, keeping the
/// occurrence with the most recent `fetched_at`.
pub fn dedupe(records: Vec<VideoRecord>) -> DedupeOutcome {
    let input_len = records.len();
    let mut sorted = records;
    // Stable: ties keep their original relative order, so the first-seen
    // row wins among equal timestamps.
    sorted.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));

    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(sorted.len());
    for record in sorted {
        if seen.insert(record.video_id.clone()) {
            kept.push(record);
        }
    }

    let removed = input_len - kept.len();
    DedupeOutcome { kept, removed }
}

/// Day-scoped variant over stored rows: restrict candidates to rows whose
/// `fetched_at` falls inside `window`, apply the same most-recent-wins rule,
/// and return the surrogate ids of the superseded rows. Rows outside the
/// window are never candidates and never returned.
///
/// Ids come back highest-first so deletion order is deterministic.
pub fn superseded_in_window(rows: &[StoredVideoRecord], window: DayWindow) -> Vec<i64> {
    let mut candidates: Vec<&StoredVideoRecord> = rows
        .iter()
        .filter(|row| window.contains(row.record.fetched_at))
        .collect();
    candidates.sort_by(|a, b| b.record.fetched_at.cmp(&a.record.fetched_at));

    let mut seen = HashSet::new();
    let mut superseded = Vec::new();
    for row in candidates {
        if !seen.insert(row.record.video_id.as_str()) {
            superseded.push(row.id);
        }
    }

    superseded.sort_unstable_by(|a, b| b.cmp(a));
    superseded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoCategory;
    use crate::utils::time::day_window;
    use chrono::{DateTime, TimeZone, Utc};

    fn record(video_id: &str, fetched_at: DateTime<Utc>, view_count: u64) -> VideoRecord {
        VideoRecord {
            fetched_at,
            hashtag: "#testtag".to_string(),
            video_id: video_id.to_string(),
            category: VideoCategory::Regular,
            title: format!("video {video_id}"),
            url: format!("https://www.youtube.com/watch?v={video_id}"),
            channel_title: "chan".to_string(),
            subscriber_count: 100,
            published_at: fetched_at,
            description: String::new(),
            view_count,
            like_count: 0,
            comment_count: 0,
        }
    }

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, n, 12, 0, 0).unwrap()
    }

    #[test]
    fn keeps_most_recent_row_per_id() {
        let outcome = dedupe(vec![
            record("vid1", day(1), 100),
            record("vid2", day(1), 10),
            record("vid1", day(2), 150),
        ]);
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.kept.len(), 2);
        let vid1 = outcome.kept.iter().find(|r| r.video_id == "vid1").unwrap();
        assert_eq!(vid1.view_count, 150);
        assert_eq!(vid1.fetched_at, day(2));
    }

    #[test]
    fn ties_resolve_to_first_seen() {
        let outcome = dedupe(vec![
            record("vid1", day(1), 1),
            record("vid1", day(1), 2),
        ]);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].view_count, 1);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            record("vid1", day(1), 100),
            record("vid1", day(2), 150),
            record("vid2", day(1), 10),
            record("vid2", day(3), 30),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.kept.clone());
        assert_eq!(twice.removed, 0);

        let mut a = once.kept.clone();
        let mut b = twice.kept;
        a.sort_by(|x, y| x.video_id.cmp(&y.video_id));
        b.sort_by(|x, y| x.video_id.cmp(&y.video_id));
        assert_eq!(a, b);
    }

    #[test]
    fn window_variant_ignores_rows_outside_the_day() {
        let tz = chrono_tz::Asia::Seoul;
        let today = day(15);
        let window = day_window(tz, today);

        let rows = vec![
            // Older fetch of vid1, outside the window: untouched.
            StoredVideoRecord {
                id: 1,
                record: record("vid1", day(10), 100),
            },
            // Two fetches of vid1 inside the window: older one superseded.
            StoredVideoRecord {
                id: 2,
                record: record("vid1", window.start + chrono::Duration::hours(1), 110),
            },
            StoredVideoRecord {
                id: 3,
                record: record("vid1", window.start + chrono::Duration::hours(5), 120),
            },
            StoredVideoRecord {
                id: 4,
                record: record("vid2", window.start + chrono::Duration::hours(2), 10),
            },
        ];

        assert_eq!(superseded_in_window(&rows, window), vec![2]);
    }
}
