//! Video record repository
//!
//! Serves both the deduplicated main table and the append-only stacking
//! table; the two share one schema and differ only in lifecycle (overwrite
//! vs. in-place deletion of superseded rows).

use sqlx::{Row, SqlitePool};

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{StoredVideoRecord, VideoCategory, VideoRecord};
use crate::utils::datetime;
use crate::utils::time::DayWindow;

/// Which physical table the repository operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoTable {
    /// `videos`: global dedupe, overwritten with deduplicated content.
    Main,
    /// `videos_daily`: append-only stacking table, day-scoped dedupe.
    Daily,
}

impl VideoTable {
    pub fn name(&self) -> &'static str {
        match self {
            VideoTable::Main => "videos",
            VideoTable::Daily => "videos_daily",
        }
    }
}

pub struct VideoRepository {
    pool: SqlitePool,
    table: VideoTable,
}

impl VideoRepository {
    pub fn new(pool: SqlitePool, table: VideoTable) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> VideoTable {
        self.table
    }

    /// Append a batch of records in one transaction.
    pub async fn append(&self, records: &[VideoRecord]) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::query_failed("begin_transaction", e.to_string())
        })?;

        for record in records {
            self.insert_record(&mut tx, record).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_transaction", e.to_string()))?;
        Ok(records.len())
    }

    /// Read the entire table in insertion order.
    pub async fn read_all(&self) -> RepositoryResult<Vec<StoredVideoRecord>> {
        let query = format!(
            "SELECT id, fetched_at, hashtag, video_id, category, title, url, channel_title,
                    subscriber_count, published_at, description, view_count, like_count, comment_count
             FROM {} ORDER BY id",
            self.table.name()
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("read_all", e.to_string()))?;

        rows.iter().map(|row| self.map_row(row)).collect()
    }

    /// Read rows whose `fetched_at` falls within the half-open window.
    ///
    /// Relies on stored timestamps being RFC3339 UTC, where string order is
    /// chronological order.
    pub async fn read_window(&self, window: DayWindow) -> RepositoryResult<Vec<StoredVideoRecord>> {
        let query = format!(
            "SELECT id, fetched_at, hashtag, video_id, category, title, url, channel_title,
                    subscriber_count, published_at, description, view_count, like_count, comment_count
             FROM {} WHERE fetched_at >= ? AND fetched_at < ? ORDER BY id",
            self.table.name()
        );
        let rows = sqlx::query(&query)
            .bind(datetime::format_for_storage(&window.start))
            .bind(datetime::format_for_storage(&window.end))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("read_window", e.to_string()))?;

        rows.iter().map(|row| self.map_row(row)).collect()
    }

    /// Replace the whole table with `records` in one transaction. Used by
    /// the full sync after the global dedupe pass.
    pub async fn overwrite_with(&self, records: &[VideoRecord]) -> RepositoryResult<usize> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::query_failed("begin_transaction", e.to_string())
        })?;

        let delete = format!("DELETE FROM {}", self.table.name());
        sqlx::query(&delete)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::query_failed("overwrite_delete", e.to_string()))?;

        for record in records {
            self.insert_record(&mut tx, record).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_transaction", e.to_string()))?;
        Ok(records.len())
    }

    /// Delete rows by surrogate id. Used by the day-scoped dedupe to remove
    /// superseded rows in place.
    pub async fn delete_by_ids(&self, ids: &[i64]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!(
            "DELETE FROM {} WHERE id IN ({placeholders})",
            self.table.name()
        );
        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id);
        }
        let result = q
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("delete_by_ids", e.to_string()))?;
        Ok(result.rows_affected() as usize)
    }

    pub async fn count(&self) -> RepositoryResult<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", self.table.name());
        sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query_failed("count", e.to_string()))
    }

    async fn insert_record(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        record: &VideoRecord,
    ) -> RepositoryResult<()> {
        let query = format!(
            "INSERT INTO {} (
                fetched_at, hashtag, video_id, category, title, url, channel_title,
                subscriber_count, published_at, description, view_count, like_count, comment_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.table.name()
        );
        sqlx::query(&query)
            .bind(datetime::format_for_storage(&record.fetched_at))
            .bind(&record.hashtag)
            .bind(&record.video_id)
            .bind(record.category.as_str())
            .bind(&record.title)
            .bind(&record.url)
            .bind(&record.channel_title)
            .bind(record.subscriber_count as i64)
            .bind(datetime::format_for_storage(&record.published_at))
            .bind(&record.description)
            .bind(record.view_count as i64)
            .bind(record.like_count as i64)
            .bind(record.comment_count as i64)
            .execute(&mut **tx)
            .await
            .map_err(|e| RepositoryError::query_failed("insert_video", e.to_string()))?;
        Ok(())
    }

    fn map_row(&self, row: &sqlx::sqlite::SqliteRow) -> RepositoryResult<StoredVideoRecord> {
        let table = self.table.name();

        let id: i64 = self.get_column(row, "id")?;
        let fetched_at_raw: String = self.get_column(row, "fetched_at")?;
        let fetched_at = datetime::parse_flexible(&fetched_at_raw)
            .map_err(|_| RepositoryError::invalid_value(table, "fetched_at", fetched_at_raw.clone()))?;
        let published_at_raw: String = self.get_column(row, "published_at")?;
        let published_at = datetime::parse_flexible(&published_at_raw).map_err(|_| {
            RepositoryError::invalid_value(table, "published_at", published_at_raw.clone())
        })?;
        let category_raw: String = self.get_column(row, "category")?;
        let category = VideoCategory::from_str_opt(&category_raw)
            .ok_or_else(|| RepositoryError::invalid_value(table, "category", category_raw.clone()))?;

        Ok(StoredVideoRecord {
            id,
            record: VideoRecord {
                fetched_at,
                hashtag: self.get_column(row, "hashtag")?,
                video_id: self.get_column(row, "video_id")?,
                category,
                title: self.get_column(row, "title")?,
                url: self.get_column(row, "url")?,
                channel_title: self.get_column(row, "channel_title")?,
                subscriber_count: self.get_count_column(row, "subscriber_count")?,
                published_at,
                description: self.get_column(row, "description")?,
                view_count: self.get_count_column(row, "view_count")?,
                like_count: self.get_count_column(row, "like_count")?,
                comment_count: self.get_count_column(row, "comment_count")?,
            },
        })
    }

    fn get_column<'r, T>(&self, row: &'r sqlx::sqlite::SqliteRow, column: &str) -> RepositoryResult<T>
    where
        T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        row.try_get(column)
            .map_err(|e| RepositoryError::invalid_column(self.table.name(), column, e.to_string()))
    }

    /// Counters are stored as non-negative integers; a negative value means
    /// the row was tampered with and is reported, not clamped.
    fn get_count_column(
        &self,
        row: &sqlx::sqlite::SqliteRow,
        column: &str,
    ) -> RepositoryResult<u64> {
        let value: i64 = self.get_column(row, column)?;
        u64::try_from(value).map_err(|_| {
            RepositoryError::invalid_value(self.table.name(), column, value.to_string())
        })
    }
}
