//! Channel metadata aggregation.
//!
//! Collapses the `channels.list` + `playlistItems.list` answers for one
//! channel into a flat [`ChannelRecord`] ready to be written to a sheet row.
//! Missing data never produces an empty cell: every absent value is replaced
//! by a fixed placeholder so a processed row is always completely filled.
//!
//! Placeholders:
//! - [`DESCRIPTION_ABSENT`] - the channel exists but has no description (and
//!   the description slot of a missing channel);
//! - [`NOT_AVAILABLE`] - a statistic the channel hides, or a latest-upload
//!   title that cannot be fetched (no uploads playlist, empty playlist,
//!   playlist deleted);
//! - [`DATA_NOT_FOUND`] - the four data slots of a channel the API does not
//!   know at all.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::youtube::{ChannelId, YouTubeApi};

/// Placeholder for a missing channel description.
pub const DESCRIPTION_ABSENT: &str = "Description Absent";

/// Placeholder for a hidden statistic or unavailable latest-upload title.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder written when the channel itself cannot be found.
pub const DATA_NOT_FOUND: &str = "Data Not Found";

/// One fully-normalised sheet row of channel metadata.
///
/// Counters stay strings: the API serialises them as strings and the sheet
/// stores text, so parsing them to integers would only lose the placeholder
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel description, or [`DESCRIPTION_ABSENT`].
    pub description: String,
    /// Subscriber count, or [`NOT_AVAILABLE`].
    pub subscribers: String,
    /// Public video count, or [`NOT_AVAILABLE`].
    pub video_count: String,
    /// Total view count, or [`NOT_AVAILABLE`].
    pub view_count: String,
    /// Title of the most recent upload, or [`NOT_AVAILABLE`].
    pub latest_video_title: String,
}

impl ChannelRecord {
    /// The record written when the API has no channel for a resolved ID.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            description: DESCRIPTION_ABSENT.to_string(),
            subscribers: DATA_NOT_FOUND.to_string(),
            video_count: DATA_NOT_FOUND.to_string(),
            view_count: DATA_NOT_FOUND.to_string(),
            latest_video_title: DATA_NOT_FOUND.to_string(),
        }
    }

    /// Field values in sheet write order.
    #[must_use]
    pub fn values(&self) -> [&str; 5] {
        [
            &self.description,
            &self.subscribers,
            &self.video_count,
            &self.view_count,
            &self.latest_video_title,
        ]
    }
}

/// Fetch and normalise the metadata record for a channel.
///
/// The latest-upload title is only looked up when the channel actually
/// advertises an uploads playlist; a deleted or empty playlist degrades to
/// [`NOT_AVAILABLE`] instead of failing the row.
///
/// # Errors
///
/// Returns an error if an API call fails with anything other than quota
/// exhaustion (absorbed below this layer) or not-found (absorbed here).
pub fn aggregate<A: YouTubeApi>(api: &mut A, id: &ChannelId) -> Result<ChannelRecord> {
    debug!(channel_id = %id, "aggregating channel metadata");

    let details = match api.channel_details(id) {
        Ok(Some(details)) => details,
        Ok(None) => {
            info!(channel_id = %id, "API has no such channel, using not-found record");
            return Ok(ChannelRecord::not_found());
        }
        Err(e) if e.is_not_found() => {
            info!(channel_id = %id, "channel lookup answered not-found, using not-found record");
            return Ok(ChannelRecord::not_found());
        }
        Err(e) => return Err(e.into()),
    };

    let latest_video_title = match details.uploads_playlist {
        None => NOT_AVAILABLE.to_string(),
        Some(playlist_id) => match api.latest_upload_title(&playlist_id) {
            Ok(Some(title)) => title,
            Ok(None) => NOT_AVAILABLE.to_string(),
            Err(e) if e.is_not_found() => {
                warn!(playlist_id = %playlist_id, "uploads playlist not found, using placeholder");
                NOT_AVAILABLE.to_string()
            }
            Err(e) => return Err(e.into()),
        },
    };

    let record = ChannelRecord {
        description: details
            .description
            .unwrap_or_else(|| DESCRIPTION_ABSENT.to_string()),
        subscribers: details
            .subscriber_count
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        video_count: details
            .video_count
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        view_count: details
            .view_count
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        latest_video_title,
    };

    info!(
        channel_id = %id,
        subscribers = %record.subscribers,
        videos = %record.video_count,
        "aggregated channel metadata"
    );
    Ok(record)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::youtube::{ChannelDetails, MockYouTubeApi};

    fn full_details() -> ChannelDetails {
        ChannelDetails {
            description: Some("All about ferrets".to_string()),
            subscriber_count: Some("12000".to_string()),
            video_count: Some("340".to_string()),
            view_count: Some("9876543".to_string()),
            uploads_playlist: Some("UUferrets".to_string()),
        }
    }

    #[test]
    fn test_aggregate_full_record() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .withf(|id| id.as_str() == "UCferrets")
            .times(1)
            .returning(|_| Ok(Some(full_details())));
        api.expect_latest_upload_title()
            .withf(|playlist_id| playlist_id == "UUferrets")
            .times(1)
            .returning(|_| Ok(Some("Ferret bathtime".to_string())));

        let record =
            aggregate(&mut api, &ChannelId::new("UCferrets")).expect("Should aggregate");

        assert_eq!(record.description, "All about ferrets");
        assert_eq!(record.subscribers, "12000");
        assert_eq!(record.video_count, "340");
        assert_eq!(record.view_count, "9876543");
        assert_eq!(record.latest_video_title, "Ferret bathtime");
    }

    #[test]
    fn test_aggregate_fills_placeholders_for_missing_fields() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details().returning(|_| {
            Ok(Some(ChannelDetails {
                description: None,
                subscriber_count: None,
                video_count: Some("5".to_string()),
                view_count: None,
                uploads_playlist: Some("UUx".to_string()),
            }))
        });
        api.expect_latest_upload_title()
            .returning(|_| Ok(Some("Only video".to_string())));

        let record = aggregate(&mut api, &ChannelId::new("UCx")).expect("Should aggregate");

        assert_eq!(record.description, DESCRIPTION_ABSENT);
        assert_eq!(record.subscribers, NOT_AVAILABLE);
        assert_eq!(record.video_count, "5");
        assert_eq!(record.view_count, NOT_AVAILABLE);
    }

    #[test]
    fn test_aggregate_missing_channel_writes_not_found_record() {
        // No expectation on latest_upload_title: calling it would panic.
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details().returning(|_| Ok(None));

        let record = aggregate(&mut api, &ChannelId::new("UCgone")).expect("Should aggregate");

        assert_eq!(record, ChannelRecord::not_found());
        assert_eq!(record.description, DESCRIPTION_ABSENT);
        assert_eq!(record.subscribers, DATA_NOT_FOUND);
        assert_eq!(record.latest_video_title, DATA_NOT_FOUND);
    }

    #[test]
    fn test_aggregate_treats_not_found_error_like_missing_channel() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .returning(|_| Err(ApiError::not_found("channel")));

        let record = aggregate(&mut api, &ChannelId::new("UCgone")).expect("Should aggregate");
        assert_eq!(record, ChannelRecord::not_found());
    }

    #[test]
    fn test_aggregate_without_uploads_playlist_skips_lookup() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details().returning(|_| {
            Ok(Some(ChannelDetails {
                uploads_playlist: None,
                ..full_details()
            }))
        });

        let record = aggregate(&mut api, &ChannelId::new("UCquiet")).expect("Should aggregate");
        assert_eq!(record.latest_video_title, NOT_AVAILABLE);
    }

    #[test]
    fn test_aggregate_empty_uploads_playlist_degrades_to_placeholder() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .returning(|_| Ok(Some(full_details())));
        api.expect_latest_upload_title().returning(|_| Ok(None));

        let record = aggregate(&mut api, &ChannelId::new("UCferrets")).expect("Should aggregate");
        assert_eq!(record.latest_video_title, NOT_AVAILABLE);
    }

    #[test]
    fn test_aggregate_deleted_uploads_playlist_degrades_to_placeholder() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .returning(|_| Ok(Some(full_details())));
        api.expect_latest_upload_title()
            .returning(|_| Err(ApiError::not_found("playlist UUferrets")));

        let record = aggregate(&mut api, &ChannelId::new("UCferrets")).expect("Should aggregate");
        assert_eq!(record.latest_video_title, NOT_AVAILABLE);
        assert_eq!(record.description, "All about ferrets");
    }

    #[test]
    fn test_aggregate_propagates_real_failures_from_latest_lookup() {
        let mut api = MockYouTubeApi::new();
        api.expect_channel_details()
            .returning(|_| Ok(Some(full_details())));
        api.expect_latest_upload_title().returning(|_| {
            Err(ApiError::Status {
                status: 500,
                message: "backend unavailable".to_string(),
            })
        });

        assert!(aggregate(&mut api, &ChannelId::new("UCferrets")).is_err());
    }

    #[test]
    fn test_values_write_order() {
        let record = ChannelRecord {
            description: "d".to_string(),
            subscribers: "s".to_string(),
            video_count: "vc".to_string(),
            view_count: "vw".to_string(),
            latest_video_title: "t".to_string(),
        };
        assert_eq!(record.values(), ["d", "s", "vc", "vw", "t"]);
    }
}
