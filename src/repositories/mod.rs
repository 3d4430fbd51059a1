//! Data access layer
//!
//! Each logical table is owned by exactly one repository; pipeline stages
//! never touch the pool directly. Column access is strictly by name — a
//! missing or ill-typed column surfaces as a typed `RepositoryError` instead
//! of a silently wrong index.

pub mod daily_stats;
pub mod subscriber_history;
pub mod videos;

pub use daily_stats::DailyStatsRepository;
pub use subscriber_history::SubscriberHistoryRepository;
pub use videos::{VideoRepository, VideoTable};
