//! Per-day, per-hashtag, per-category aggregation
//!
//! Every configured hashtag and category combination always produces a row,
//! zeros included, so downstream consumers see a dense grid per day rather
//! than a sparse one.

use std::collections::HashSet;

use crate::models::{DailyStatRow, VideoCategory, VideoRecord};

/// Reduce `records` into one `DailyStatRow` per (hashtag, category) pair for
/// the given day string.
pub fn aggregate(records: &[VideoRecord], hashtags: &[String], date: &str) -> Vec<DailyStatRow> {
    let mut rows = Vec::with_capacity(hashtags.len() * VideoCategory::ALL.len());

    for hashtag in hashtags {
        for category in VideoCategory::ALL {
            let mut video_count = 0u64;
            let mut total_views = 0u64;
            let mut channels: HashSet<&str> = HashSet::new();

            for record in records
                .iter()
                .filter(|r| r.hashtag == *hashtag && r.category == category)
            {
                video_count += 1;
                total_views += record.view_count;
                channels.insert(record.channel_title.as_str());
            }

            rows.push(DailyStatRow {
                date: date.to_string(),
                hashtag: hashtag.clone(),
                category,
                video_count,
                channel_count: channels.len() as u64,
                total_views,
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(hashtag: &str, category: VideoCategory, channel: &str, views: u64) -> VideoRecord {
        let now = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
        VideoRecord {
            fetched_at: now,
            hashtag: hashtag.to_string(),
            video_id: format!("{hashtag}-{channel}-{views}"),
            category,
            title: String::new(),
            url: String::new(),
            channel_title: channel.to_string(),
            subscriber_count: 0,
            published_at: now,
            description: String::new(),
            view_count: views,
            like_count: 0,
            comment_count: 0,
        }
    }

    #[test]
    fn emits_zero_rows_for_unmatched_combinations() {
        let hashtags = vec!["#a".to_string(), "#b".to_string()];
        let rows = aggregate(&[], &hashtags, "2023-06-15");
        assert_eq!(rows.len(), 4);
        for row in &rows {
            assert_eq!(row.video_count, 0);
            assert_eq!(row.channel_count, 0);
            assert_eq!(row.total_views, 0);
            assert_eq!(row.date, "2023-06-15");
        }
    }

    #[test]
    fn sums_views_and_counts_distinct_channels() {
        let hashtags = vec!["#a".to_string()];
        let records = vec![
            record("#a", VideoCategory::Regular, "chan1", 100),
            record("#a", VideoCategory::Regular, "chan1", 50),
            record("#a", VideoCategory::Regular, "chan2", 25),
            record("#a", VideoCategory::Short, "chan3", 7),
        ];
        let rows = aggregate(&records, &hashtags, "2023-06-15");

        let regular = rows
            .iter()
            .find(|r| r.category == VideoCategory::Regular)
            .unwrap();
        assert_eq!(regular.video_count, 3);
        assert_eq!(regular.channel_count, 2);
        assert_eq!(regular.total_views, 175);

        let short = rows
            .iter()
            .find(|r| r.category == VideoCategory::Short)
            .unwrap();
        assert_eq!(short.video_count, 1);
        assert_eq!(short.channel_count, 1);
        assert_eq!(short.total_views, 7);
    }

    #[test]
    fn video_matching_two_hashtags_counts_in_both() {
        // Stats run over raw per-tag fetches, so a video surfaced by two
        // searches contributes to both hashtag rows.
        let hashtags = vec!["#a".to_string(), "#b".to_string()];
        let mut a = record("#a", VideoCategory::Regular, "chan1", 100);
        let mut b = record("#b", VideoCategory::Regular, "chan1", 100);
        a.video_id = "same-vid".to_string();
        b.video_id = "same-vid".to_string();

        let rows = aggregate(&[a, b], &hashtags, "2023-06-15");
        let row_a = rows
            .iter()
            .find(|r| r.hashtag == "#a" && r.category == VideoCategory::Regular)
            .unwrap();
        let row_b = rows
            .iter()
            .find(|r| r.hashtag == "#b" && r.category == VideoCategory::Regular)
            .unwrap();
        assert_eq!(row_a.video_count, 1);
        assert_eq!(row_b.video_count, 1);
    }
}
