//! Per-channel subscriber and view fold
//!
//! Recomputed from scratch over the whole main table on every invocation:
//! subscriber count is the running max per channel (never decreases within
//! one fold), view count is the running sum.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{ChannelSnapshot, VideoRecord};

/// Fold `rows` into one dated snapshot per distinct channel title, ordered
/// by channel title.
pub fn snapshot(rows: &[VideoRecord], date: DateTime<Utc>) -> Vec<ChannelSnapshot> {
    let mut folds: BTreeMap<&str, (u64, u64)> = BTreeMap::new();

    for row in rows {
        let entry = folds.entry(row.channel_title.as_str()).or_insert((0, 0));
        entry.0 = entry.0.max(row.subscriber_count);
        entry.1 += row.view_count;
    }

    folds
        .into_iter()
        .map(|(channel_title, (subscriber_count, view_count))| ChannelSnapshot {
            date,
            channel_title: channel_title.to_string(),
            subscriber_count,
            view_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoCategory;
    use chrono::TimeZone;

    fn record(channel: &str, subscribers: u64, views: u64) -> VideoRecord {
        let now = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
        VideoRecord {
            fetched_at: now,
            hashtag: "#t".to_string(),
            video_id: format!("{channel}-{views}"),
            category: VideoCategory::Regular,
            title: String::new(),
            url: String::new(),
            channel_title: channel.to_string(),
            subscriber_count: subscribers,
            published_at: now,
            description: String::new(),
            view_count: views,
            like_count: 0,
            comment_count: 0,
        }
    }

    #[test]
    fn subscriber_count_takes_running_max() {
        let date = Utc.with_ymd_and_hms(2023, 6, 16, 0, 0, 0).unwrap();
        let rows = vec![
            record("chan", 5000, 10),
            record("chan", 4000, 20),
            record("chan", 6000, 30),
        ];
        let snapshots = snapshot(&rows, date);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].subscriber_count, 6000);
        assert_eq!(snapshots[0].view_count, 60);
        assert_eq!(snapshots[0].date, date);
    }

    #[test]
    fn one_snapshot_per_channel_ordered_by_title() {
        let date = Utc.with_ymd_and_hms(2023, 6, 16, 0, 0, 0).unwrap();
        let rows = vec![
            record("zebra", 10, 1),
            record("alpha", 20, 2),
            record("zebra", 15, 3),
        ];
        let snapshots = snapshot(&rows, date);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].channel_title, "alpha");
        assert_eq!(snapshots[1].channel_title, "zebra");
        assert_eq!(snapshots[1].subscriber_count, 15);
        assert_eq!(snapshots[1].view_count, 4);
    }

    #[test]
    fn empty_table_folds_to_no_snapshots() {
        let date = Utc.with_ymd_and_hms(2023, 6, 16, 0, 0, 0).unwrap();
        assert!(snapshot(&[], date).is_empty());
    }
}
