//! Video search/metadata provider layer
//!
//! The provider is abstracted behind [`VideoSource`] so the pipeline can be
//! exercised against a mock in tests. The only concrete implementation is
//! the YouTube Data API v3 client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::SourceResult;

pub mod normalize;
pub mod types;
pub mod youtube;

pub use types::{RawChannel, RawVideo, TagFetch};
pub use youtube::YouTubeClient;

/// A provider that can resolve all videos matching a search term, together
/// with metadata for the channels that published them.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch all videos matching `tag` published after `published_after`,
    /// with statistics resolved, plus a lookup of channel metadata keyed by
    /// channel id.
    ///
    /// Implementations return errors; per-tag degradation to an empty
    /// result is the orchestrator's decision, not the source's.
    async fn fetch_videos_for_tag(
        &self,
        tag: &str,
        published_after: DateTime<Utc>,
    ) -> SourceResult<TagFetch>;
}
