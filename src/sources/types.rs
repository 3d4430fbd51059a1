//! Raw provider payload shapes
//!
//! Wire types mirror the YouTube Data API v3 JSON. Everything optional stays
//! optional here; defaulting and skipping decisions belong to the
//! normalizer. The search response's union-typed `id` field is collapsed to
//! a plain string inside the client and never leaks past this module.

use std::collections::HashMap;

use serde::Deserialize;

/// Everything fetched for one hashtag in one provider round trip.
#[derive(Debug, Clone, Default)]
pub struct TagFetch {
    pub videos: Vec<RawVideo>,
    /// Channel metadata keyed by channel id.
    pub channels: HashMap<String, RawChannel>,
}

/// A video entry with full metadata, as returned by `videos.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVideo {
    #[serde(default)]
    pub id: String,
    pub snippet: Option<RawSnippet>,
    pub statistics: Option<RawStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnippet {
    pub published_at: Option<String>,
    pub channel_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Count fields arrive string-encoded; missing fields are omitted entirely
/// for videos with disabled counters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
    pub subscriber_count: Option<String>,
}

/// Channel metadata as resolved by `channels.list`.
#[derive(Debug, Clone, Default)]
pub struct RawChannel {
    pub title: Option<String>,
    pub subscriber_count: Option<String>,
}

// --- wire-only shapes below; constructed by serde, consumed by the client ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: Option<SearchItemId>,
}

/// The search endpoint returns `id` either as a plain string or as a nested
/// object carrying `videoId`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchItemId {
    Plain(String),
    Nested {
        #[serde(rename = "videoId")]
        video_id: Option<String>,
    },
}

impl SearchItemId {
    /// Collapse the union to a non-empty video id, if one is present.
    pub(crate) fn into_video_id(self) -> Option<String> {
        let id = match self {
            SearchItemId::Plain(id) => id,
            SearchItemId::Nested { video_id } => video_id?,
        };
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<RawVideo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelItem {
    #[serde(default)]
    pub id: String,
    pub snippet: Option<RawSnippet>,
    pub statistics: Option<RawStatistics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_id_union_collapses_to_string() {
        let plain: SearchItemId = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(plain.into_video_id(), Some("abc123".to_string()));

        let nested: SearchItemId =
            serde_json::from_str(r#"{"kind":"youtube#video","videoId":"xyz789"}"#).unwrap();
        assert_eq!(nested.into_video_id(), Some("xyz789".to_string()));

        let missing: SearchItemId =
            serde_json::from_str(r#"{"kind":"youtube#channel"}"#).unwrap();
        assert_eq!(missing.into_video_id(), None);
    }

    #[test]
    fn statistics_counts_stay_string_encoded() {
        let stats: RawStatistics =
            serde_json::from_str(r#"{"viewCount":"1234","likeCount":"56"}"#).unwrap();
        assert_eq!(stats.view_count.as_deref(), Some("1234"));
        assert_eq!(stats.comment_count, None);
    }
}
