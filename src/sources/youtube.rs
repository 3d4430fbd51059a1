//! YouTube Data API v3 client
//!
//! Implements the three-call fetch shape per hashtag: paginated `search.list`
//! to collect video ids, one batched `videos.list` pass for statistics, and
//! one batched `channels.list` pass for channel metadata. Pagination is
//! capped to bound quota cost per tag per run.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::YouTubeConfig;
use crate::errors::{SourceError, SourceResult};
use crate::sources::types::{
    ChannelListResponse, RawChannel, RawVideo, SearchResponse, TagFetch, VideoListResponse,
};
use crate::sources::VideoSource;

/// The API accepts at most this many ids per `videos.list`/`channels.list`
/// call.
const ID_BATCH_SIZE: usize = 50;

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_pages: u32,
    page_size: u32,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("tagwatch/0.1")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_pages: config.max_pages,
            page_size: config.page_size,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> SourceResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(endpoint.to_string(), e.to_string()))
    }

    /// Collect matching video ids across search pages, following the
    /// continuation token up to the configured page cap. Stops early on an
    /// empty page or a missing token.
    async fn search_video_ids(
        &self,
        tag: &str,
        published_after: DateTime<Utc>,
    ) -> SourceResult<Vec<String>> {
        let published_after = published_after.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let page_size = self.page_size.to_string();
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..self.max_pages {
            let mut params = vec![
                ("part", "id"),
                ("q", tag),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", page_size.as_str()),
                ("publishedAfter", published_after.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response: SearchResponse = self.get_json("search", &params).await?;
            if response.items.is_empty() {
                debug!(tag, page, "Empty search page, stopping pagination");
                break;
            }

            ids.extend(
                response
                    .items
                    .into_iter()
                    .filter_map(|item| item.id)
                    .filter_map(|id| id.into_video_id()),
            );

            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(tag, count = ids.len(), "Collected video ids from search");
        Ok(ids)
    }

    /// Batch-resolve snippet and statistics for the collected ids.
    async fn resolve_videos(&self, ids: &[String]) -> SourceResult<Vec<RawVideo>> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_BATCH_SIZE) {
            let joined = chunk.join(",");
            let params = [("part", "snippet,statistics"), ("id", joined.as_str())];
            let response: VideoListResponse = self.get_json("videos", &params).await?;
            videos.extend(response.items);
        }
        Ok(videos)
    }

    /// Batch-resolve title and subscriber count for the distinct channel ids
    /// referenced by the videos.
    async fn resolve_channels(
        &self,
        ids: &[String],
    ) -> SourceResult<HashMap<String, RawChannel>> {
        let mut channels = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(ID_BATCH_SIZE) {
            let joined = chunk.join(",");
            let params = [("part", "snippet,statistics"), ("id", joined.as_str())];
            let response: ChannelListResponse = self.get_json("channels", &params).await?;
            for item in response.items {
                if item.id.is_empty() {
                    continue;
                }
                let title = item.snippet.map(|s| s.title).filter(|t| !t.is_empty());
                let subscriber_count = item.statistics.and_then(|s| s.subscriber_count);
                channels.insert(
                    item.id,
                    RawChannel {
                        title,
                        subscriber_count,
                    },
                );
            }
        }
        Ok(channels)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn fetch_videos_for_tag(
        &self,
        tag: &str,
        published_after: DateTime<Utc>,
    ) -> SourceResult<TagFetch> {
        let ids = self.search_video_ids(tag, published_after).await?;
        if ids.is_empty() {
            info!(tag, "No videos matched the search window");
            return Ok(TagFetch::default());
        }

        let videos = self.resolve_videos(&ids).await?;

        let mut channel_ids: Vec<String> = videos
            .iter()
            .filter_map(|v| v.snippet.as_ref())
            .filter_map(|s| s.channel_id.clone())
            .collect();
        channel_ids.sort();
        channel_ids.dedup();

        let channels = self.resolve_channels(&channel_ids).await?;

        info!(
            tag,
            videos = videos.len(),
            channels = channels.len(),
            "Fetched tag data from provider"
        );
        Ok(TagFetch { videos, channels })
    }
}
