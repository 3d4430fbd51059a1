//! Daily statistics repository
//!
//! Append-only: each stats run appends its full zero-filled row grid for the
//! day. Reads come back ordered (date desc, hashtag asc, category asc),
//! which stands in for the original's re-sort of the whole log.

use sqlx::{Row, SqlitePool};

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{DailyStatRow, VideoCategory};

pub struct DailyStatsRepository {
    pool: SqlitePool,
}

impl DailyStatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, rows: &[DailyStatRow]) -> RepositoryResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::query_failed("begin_transaction", e.to_string())
        })?;

        for row in rows {
            sqlx::query(
                "INSERT INTO daily_stats (date, hashtag, category, video_count, channel_count, total_views)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&row.date)
            .bind(&row.hashtag)
            .bind(row.category.as_str())
            .bind(row.video_count as i64)
            .bind(row.channel_count as i64)
            .bind(row.total_views as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::query_failed("insert_daily_stat", e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_transaction", e.to_string()))?;
        Ok(rows.len())
    }

    pub async fn read_all_ordered(&self) -> RepositoryResult<Vec<DailyStatRow>> {
        let rows = sqlx::query(
            "SELECT date, hashtag, category, video_count, channel_count, total_views
             FROM daily_stats
             ORDER BY date DESC, hashtag ASC, category ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query_failed("read_daily_stats", e.to_string()))?;

        rows.iter()
            .map(|row| {
                let category_raw: String = row.try_get("category").map_err(|e| {
                    RepositoryError::invalid_column("daily_stats", "category", e.to_string())
                })?;
                let category = VideoCategory::from_str_opt(&category_raw).ok_or_else(|| {
                    RepositoryError::invalid_value("daily_stats", "category", category_raw.clone())
                })?;
                Ok(DailyStatRow {
                    date: row.try_get("date").map_err(|e| {
                        RepositoryError::invalid_column("daily_stats", "date", e.to_string())
                    })?,
                    hashtag: row.try_get("hashtag").map_err(|e| {
                        RepositoryError::invalid_column("daily_stats", "hashtag", e.to_string())
                    })?,
                    category,
                    video_count: count_column(row, "video_count")?,
                    channel_count: count_column(row, "channel_count")?,
                    total_views: count_column(row, "total_views")?,
                })
            })
            .collect()
    }
}

fn count_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> RepositoryResult<u64> {
    let value: i64 = row
        .try_get(column)
        .map_err(|e| RepositoryError::invalid_column("daily_stats", column, e.to_string()))?;
    u64::try_from(value)
        .map_err(|_| RepositoryError::invalid_value("daily_stats", column, value.to_string()))
}
