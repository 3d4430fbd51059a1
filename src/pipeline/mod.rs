//! Pipeline orchestration
//!
//! Sequences source fetches, normalization, dedupe, aggregation, and store
//! writes into the four externally-invoked workflows. Hashtags are processed
//! sequentially and failure-isolated: one tag's provider or write failure is
//! logged, recorded in its outcome, and the run moves on to the next tag.
//! Configuration and schema failures remain fatal for the operation.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{SnapshotReport, StatsReport, SyncReport, TagOutcome, VideoRecord};
use crate::repositories::{
    DailyStatsRepository, SubscriberHistoryRepository, VideoRepository, VideoTable,
};
use crate::sources::{normalize, VideoSource};
use crate::utils::time;

pub mod aggregate;
pub mod dedupe;
pub mod subscribers;

pub struct Pipeline<S: VideoSource> {
    source: S,
    main: VideoRepository,
    daily: VideoRepository,
    stats: DailyStatsRepository,
    history: SubscriberHistoryRepository,
    hashtags: Vec<String>,
    timezone: Tz,
    lookback_days: i64,
}

impl<S: VideoSource> Pipeline<S> {
    pub fn new(source: S, database: &Database, config: &Config) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            source,
            main: VideoRepository::new(database.pool(), VideoTable::Main),
            daily: VideoRepository::new(database.pool(), VideoTable::Daily),
            stats: DailyStatsRepository::new(database.pool()),
            history: SubscriberHistoryRepository::new(database.pool()),
            hashtags: config.tracking.hashtags.clone(),
            timezone: config.timezone()?,
            lookback_days: config.tracking.lookback_days,
        })
    }

    /// Full historical sync: fetch the lookback window for every hashtag,
    /// append to the main table, then globally dedupe the entire table and
    /// overwrite it with the deduplicated content.
    pub async fn run_full_sync(&self) -> AppResult<SyncReport> {
        let now = Utc::now();
        let published_after = now - Duration::days(self.lookback_days);
        info!(
            hashtags = self.hashtags.len(),
            %published_after,
            "Starting full sync"
        );

        let outcomes = self
            .fetch_and_append(&self.main, published_after, now)
            .await;

        // Dedupe the whole table, not just this run's rows: earlier runs may
        // have left duplicates behind.
        let stored = self.main.read_all().await?;
        let records: Vec<VideoRecord> = stored.into_iter().map(|s| s.record).collect();
        let outcome = dedupe::dedupe(records);
        self.main.overwrite_with(&outcome.kept).await?;

        if outcome.removed > 0 {
            info!(removed = outcome.removed, "Collapsed duplicate rows in main table");
        }

        let report = SyncReport {
            outcomes,
            duplicates_removed: outcome.removed,
        };
        info!(
            appended = report.total_appended(),
            failed_tags = report.failed_tags().count(),
            "Full sync finished"
        );
        Ok(report)
    }

    /// Daily incremental: fetch since local start-of-day into the stacking
    /// table, then collapse today's duplicates in place. Rows from earlier
    /// days are never rewritten.
    pub async fn run_daily_incremental(&self) -> AppResult<SyncReport> {
        let now = Utc::now();
        let window = time::day_window(self.timezone, now);
        info!(
            hashtags = self.hashtags.len(),
            window_start = %window.start,
            "Starting daily incremental run"
        );

        let outcomes = self.fetch_and_append(&self.daily, window.start, now).await;

        let todays_rows = self.daily.read_window(window).await?;
        let superseded = dedupe::superseded_in_window(&todays_rows, window);
        let removed = self.daily.delete_by_ids(&superseded).await?;
        if removed > 0 {
            info!(removed, "Removed superseded rows from today's window");
        }

        let report = SyncReport {
            outcomes,
            duplicates_removed: removed,
        };
        info!(
            appended = report.total_appended(),
            failed_tags = report.failed_tags().count(),
            "Daily incremental run finished"
        );
        Ok(report)
    }

    /// Compute and append one day's statistics rows.
    ///
    /// Aggregates over fresh per-tag fetches, not the deduplicated store: a
    /// video matched by several hashtags counts once per hashtag. That
    /// mirrors the long-standing behavior of this job and is covered by
    /// tests; change it deliberately or not at all.
    pub async fn compute_daily_stats(&self) -> AppResult<StatsReport> {
        let now = Utc::now();
        let since = time::start_of_day(self.timezone, now);
        let date = time::local_date_string(self.timezone, now);
        info!(%date, "Computing daily statistics");

        let mut records = Vec::new();
        let mut outcomes = Vec::new();
        for hashtag in &self.hashtags {
            match self.fetch_tag(hashtag, since, now).await {
                Ok(tag_records) => {
                    outcomes.push(TagOutcome {
                        hashtag: hashtag.clone(),
                        fetched: tag_records.len(),
                        appended: 0,
                        error: None,
                    });
                    records.extend(tag_records);
                }
                Err(e) => {
                    error!(hashtag = %hashtag, error = %e, "Tag fetch failed; its stats degrade to zero");
                    outcomes.push(TagOutcome::failed(hashtag, e.to_string()));
                }
            }
        }

        let rows = aggregate::aggregate(&records, &self.hashtags, &date);
        self.stats.append(&rows).await?;
        info!(rows = rows.len(), "Appended daily statistics");

        Ok(StatsReport {
            date,
            rows,
            outcomes,
        })
    }

    /// Recompute per-channel snapshots from the current main table and
    /// append them to the history log.
    pub async fn update_subscriber_history(&self) -> AppResult<SnapshotReport> {
        let now = Utc::now();
        let stored = self.main.read_all().await?;
        let records: Vec<VideoRecord> = stored.into_iter().map(|s| s.record).collect();
        let snapshots = subscribers::snapshot(&records, now);
        self.history.append(&snapshots).await?;
        info!(
            channels = snapshots.len(),
            source_rows = records.len(),
            "Appended subscriber history snapshots"
        );
        Ok(SnapshotReport {
            date: now,
            channels: snapshots.len(),
            source_rows: records.len(),
        })
    }

    /// Fetch, normalize, and append every configured hashtag into `repo`,
    /// one tag at a time. Per-tag failures (fetch or write) degrade that
    /// tag's contribution to empty and are recorded in its outcome.
    async fn fetch_and_append(
        &self,
        repo: &VideoRepository,
        published_after: DateTime<Utc>,
        fetched_at: DateTime<Utc>,
    ) -> Vec<TagOutcome> {
        let mut outcomes = Vec::with_capacity(self.hashtags.len());

        for hashtag in &self.hashtags {
            let records = match self.fetch_tag(hashtag, published_after, fetched_at).await {
                Ok(records) => records,
                Err(e) => {
                    error!(hashtag = %hashtag, error = %e, "Tag fetch failed; continuing with remaining tags");
                    outcomes.push(TagOutcome::failed(hashtag, e.to_string()));
                    continue;
                }
            };

            let fetched = records.len();
            match repo.append(&records).await {
                Ok(appended) => outcomes.push(TagOutcome {
                    hashtag: hashtag.clone(),
                    fetched,
                    appended,
                    error: None,
                }),
                Err(e) => {
                    error!(hashtag = %hashtag, table = repo.table().name(), error = %e, "Append failed; continuing with remaining tags");
                    outcomes.push(TagOutcome {
                        hashtag: hashtag.clone(),
                        fetched,
                        appended: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcomes
    }

    async fn fetch_tag(
        &self,
        hashtag: &str,
        published_after: DateTime<Utc>,
        fetched_at: DateTime<Utc>,
    ) -> AppResult<Vec<VideoRecord>> {
        let fetch = self
            .source
            .fetch_videos_for_tag(hashtag, published_after)
            .await?;

        let raw_count = fetch.videos.len();
        let records: Vec<VideoRecord> = fetch
            .videos
            .iter()
            .filter_map(|raw| normalize::normalize(raw, &fetch.channels, hashtag, fetched_at))
            .collect();

        if records.len() < raw_count {
            warn!(
                hashtag,
                skipped = raw_count - records.len(),
                "Skipped entries during normalization"
            );
        }
        Ok(records)
    }
}
