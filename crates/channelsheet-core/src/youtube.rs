//! `YouTube` Data API v3 access.
//!
//! Defines the [`YouTubeApi`] trait covering the four lookups the enrichment
//! pipeline needs, plus [`YouTubeDataApi`], the real implementation that
//! issues blocking HTTP requests through the quota-aware executor:
//!
//! - `search.list` - find a channel by free-text query;
//! - `videos.list` - find the channel that owns a video;
//! - `channels.list` - snippet, statistics and upload-playlist pointer;
//! - `playlistItems.list` - title of the most recent upload.
//!
//! Every request carries the active pool key; a quota refusal rotates the
//! pool and replays the request against the next key (see
//! [`crate::executor::ApiExecutor`]), so callers of this trait never observe
//! [`ApiError::QuotaExceeded`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::executor::ApiExecutor;
use crate::pool::KeyPool;

/// Base URL of the `YouTube` Data API v3.
pub const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Canonical `YouTube` channel identifier (the `UC...` form).
///
/// Opaque token: the pipeline only ever passes it back to the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a raw channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel metadata as returned by `channels.list`.
///
/// Statistics are decimal strings on the wire (the API serialises unsigned
/// 64-bit counters as JSON strings) and stay strings here; the sheet stores
/// text either way. A hidden or missing counter is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetails {
    /// Channel description, if any.
    pub description: Option<String>,
    /// Subscriber count; hidden channels omit it.
    pub subscriber_count: Option<String>,
    /// Number of public videos.
    pub video_count: Option<String>,
    /// Total view count.
    pub view_count: Option<String>,
    /// Playlist ID of the channel's uploads playlist.
    pub uploads_playlist: Option<String>,
}

/// The four `YouTube` Data API lookups used by the enrichment pipeline.
///
/// Methods take `&mut self` because the real implementation rotates its key
/// pool as a side effect of quota handling. An empty result set is
/// `Ok(None)`, never an error.
#[cfg_attr(test, mockall::automock)]
pub trait YouTubeApi {
    /// Find the best-matching channel for a free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying API call fails with anything other
    /// than quota exhaustion.
    fn search_channel(&mut self, query: &str) -> ApiResult<Option<ChannelId>>;

    /// Find the channel that owns a video.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying API call fails with anything other
    /// than quota exhaustion.
    fn video_channel(&mut self, video_id: &str) -> ApiResult<Option<ChannelId>>;

    /// Fetch snippet, statistics and the uploads-playlist pointer for a
    /// channel. `Ok(None)` when the channel does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying API call fails with anything other
    /// than quota exhaustion.
    fn channel_details(&mut self, id: &ChannelId) -> ApiResult<Option<ChannelDetails>>;

    /// Title of the most recent entry in a playlist, typically the uploads
    /// playlist from [`ChannelDetails::uploads_playlist`].
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying API call fails with anything other
    /// than quota exhaustion. A deleted or empty playlist surfaces as
    /// `ApiError::NotFound` or `Ok(None)` respectively.
    fn latest_upload_title(&mut self, playlist_id: &str) -> ApiResult<Option<String>>;
}

/// Real [`YouTubeApi`] implementation over the `YouTube` Data API v3.
#[derive(Debug)]
pub struct YouTubeDataApi {
    executor: ApiExecutor,
    base_url: String,
}

impl YouTubeDataApi {
    /// Create an API client over a key pool.
    ///
    /// `backoff` is how long to sleep once every key in the pool has hit its
    /// quota (commonly one hour: daily quotas refill on a fixed schedule and
    /// there is nothing useful to do but wait).
    #[must_use]
    pub fn new(pool: KeyPool, backoff: Duration) -> Self {
        Self {
            executor: ApiExecutor::new(pool, backoff),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL. Intended for tests against a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The underlying executor, for rotation and backoff counters.
    #[must_use]
    pub const fn executor(&self) -> &ApiExecutor {
        &self.executor
    }

    /// Issue a GET request for `resource`, re-trying through key rotation,
    /// and decode the JSON response.
    fn get<T: DeserializeOwned>(
        &mut self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("{}/{resource}", self.base_url);

        self.executor.execute(|client| {
            // The request is rebuilt per attempt so a rotation takes effect.
            let response = client
                .http()
                .get(&url)
                .query(params)
                .query(&[("key", client.key())])
                .send()
                .map_err(|e| ApiError::transport(format!("GET {resource} failed: {e}")))?;

            let status = response.status();
            let body = response.text().map_err(|e| {
                ApiError::transport(format!("reading {resource} response failed: {e}"))
            })?;

            if !status.is_success() {
                return Err(classify_failure(status, &body));
            }

            serde_json::from_str(&body)
                .map_err(|e| ApiError::Malformed(format!("{resource} response: {e}")))
        })
    }
}

impl YouTubeApi for YouTubeDataApi {
    fn search_channel(&mut self, query: &str) -> ApiResult<Option<ChannelId>> {
        debug!(query, "searching for channel");
        let response: SearchListResponse = self.get(
            "search",
            &[
                ("part", "id"),
                ("q", query),
                ("type", "channel"),
                ("maxResults", "1"),
            ],
        )?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.id.channel_id)
            .map(ChannelId::new))
    }

    fn video_channel(&mut self, video_id: &str) -> ApiResult<Option<ChannelId>> {
        debug!(video_id, "looking up video owner");
        let response: VideoListResponse =
            self.get("videos", &[("part", "snippet"), ("id", video_id)])?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet)
            .and_then(|snippet| snippet.channel_id)
            .map(ChannelId::new))
    }

    fn channel_details(&mut self, id: &ChannelId) -> ApiResult<Option<ChannelDetails>> {
        debug!(channel_id = %id, "fetching channel details");
        let response: ChannelListResponse = self.get(
            "channels",
            &[
                ("part", "snippet,statistics,contentDetails"),
                ("id", id.as_str()),
            ],
        )?;

        Ok(response.items.into_iter().next().map(ChannelItem::into_details))
    }

    fn latest_upload_title(&mut self, playlist_id: &str) -> ApiResult<Option<String>> {
        debug!(playlist_id, "fetching latest upload title");
        let response: PlaylistItemsResponse = self.get(
            "playlistItems",
            &[
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", "1"),
            ],
        )?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet)
            .and_then(|snippet| snippet.title))
    }
}

/// Map a non-success HTTP response to the error taxonomy.
///
/// Quota refusals arrive as 403 with a `quota`-flavoured reason or message
/// (`quotaExceeded`, "you have exceeded your quota", ...). Only those rotate
/// the pool; any other 403 is a real failure and propagates.
fn classify_failure(status: reqwest::StatusCode, body: &str) -> ApiError {
    let (message, reasons) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.message,
            envelope
                .error
                .errors
                .into_iter()
                .filter_map(|detail| detail.reason)
                .collect::<Vec<_>>(),
        ),
        Err(_) => (body.trim().to_string(), Vec::new()),
    };

    if status == reqwest::StatusCode::FORBIDDEN {
        let quota_flavoured = reasons
            .iter()
            .any(|reason| reason.to_lowercase().contains("quota"))
            || message.to_lowercase().contains("quota");
        if quota_flavoured {
            return ApiError::QuotaExceeded;
        }
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        let resource = if message.is_empty() {
            "requested resource".to_string()
        } else {
            message
        };
        return ApiError::not_found(resource);
    }

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Option<VideoSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    content_details: Option<ChannelContentDetails>,
}

impl ChannelItem {
    fn into_details(self) -> ChannelDetails {
        let snippet = self.snippet.unwrap_or_default();
        let statistics = self.statistics.unwrap_or_default();
        ChannelDetails {
            description: snippet.description,
            subscriber_count: statistics.subscriber_count,
            video_count: statistics.video_count,
            view_count: statistics.view_count,
            uploads_playlist: self
                .content_details
                .and_then(|details| details.related_playlists)
                .and_then(|playlists| playlists.uploads),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChannelSnippet {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}
