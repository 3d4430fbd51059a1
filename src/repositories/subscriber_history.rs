//! Subscriber history repository
//!
//! Append-only log of dated per-channel snapshots; reads come back ordered
//! (date desc, channel title asc).

use sqlx::{Row, SqlitePool};

use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::ChannelSnapshot;
use crate::utils::datetime;

pub struct SubscriberHistoryRepository {
    pool: SqlitePool,
}

impl SubscriberHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, snapshots: &[ChannelSnapshot]) -> RepositoryResult<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::query_failed("begin_transaction", e.to_string())
        })?;

        for snapshot in snapshots {
            sqlx::query(
                "INSERT INTO subscriber_history (date, channel_title, subscriber_count, view_count)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(datetime::format_for_storage(&snapshot.date))
            .bind(&snapshot.channel_title)
            .bind(snapshot.subscriber_count as i64)
            .bind(snapshot.view_count as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::query_failed("insert_subscriber_snapshot", e.to_string())
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query_failed("commit_transaction", e.to_string()))?;
        Ok(snapshots.len())
    }

    pub async fn read_all_ordered(&self) -> RepositoryResult<Vec<ChannelSnapshot>> {
        let rows = sqlx::query(
            "SELECT date, channel_title, subscriber_count, view_count
             FROM subscriber_history
             ORDER BY date DESC, channel_title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query_failed("read_subscriber_history", e.to_string()))?;

        rows.iter()
            .map(|row| {
                let date_raw: String = row.try_get("date").map_err(|e| {
                    RepositoryError::invalid_column("subscriber_history", "date", e.to_string())
                })?;
                let date = datetime::parse_flexible(&date_raw).map_err(|_| {
                    RepositoryError::invalid_value("subscriber_history", "date", date_raw.clone())
                })?;
                Ok(ChannelSnapshot {
                    date,
                    channel_title: row.try_get("channel_title").map_err(|e| {
                        RepositoryError::invalid_column(
                            "subscriber_history",
                            "channel_title",
                            e.to_string(),
                        )
                    })?,
                    subscriber_count: count_column(row, "subscriber_count")?,
                    view_count: count_column(row, "view_count")?,
                })
            })
            .collect()
    }
}

fn count_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> RepositoryResult<u64> {
    let value: i64 = row.try_get(column).map_err(|e| {
        RepositoryError::invalid_column("subscriber_history", column, e.to_string())
    })?;
    u64::try_from(value).map_err(|_| {
        RepositoryError::invalid_value("subscriber_history", column, value.to_string())
    })
}
