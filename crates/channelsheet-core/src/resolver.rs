//! Channel URL resolution.
//!
//! Turns the heterogeneous `YouTube` URL shapes found in real-world sheets
//! into a canonical [`ChannelId`]. Classification is pure string matching;
//! shapes that do not embed the channel ID are chased through the API:
//!
//! | shape                                   | lookup                        |
//! |-----------------------------------------|-------------------------------|
//! | `youtube.com/channel/<ID>`              | none, ID extracted directly   |
//! | `youtube.com/@<handle>`                 | channel search on the handle  |
//! | `youtube.com/watch?v=<VIDEO>`           | video owner lookup            |
//! | `youtu.be/<VIDEO>`                      | video owner lookup            |
//! | `youtube.com/(c\|user\|channel\|playlist)/<SEG>` | channel search on the segment |
//! | shortener link (`bit.ly`, `tinyurl.com`) | channel search on the whole URL |
//!
//! The matchers run in that fixed order; the first hit wins. Anything that
//! matches nothing is [`Resolution::Unresolvable`], which is an ordinary
//! outcome, not an error: the caller marks the row and moves on.

use std::fmt;

use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;
use crate::youtube::{ChannelId, YouTubeApi};

/// URL shorteners that hide the real destination. A link containing one of
/// these is thrown at channel search whole, which works surprisingly often
/// because search indexes the redirect targets.
const SHORTENER_DOMAINS: [&str; 2] = ["bit.ly", "tinyurl.com"];

/// The recognised `YouTube` URL shapes, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    /// Canonical channel link embedding the channel ID.
    Channel,
    /// Handle link (`@name`).
    Handle,
    /// Full watch URL.
    Video,
    /// `youtu.be` short video URL.
    ShortVideo,
    /// Legacy custom path (`/c/`, `/user/`, `/channel/`, `/playlist/`).
    CustomPath,
    /// Link through a URL shortener.
    Shortened,
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel => write!(f, "channel link"),
            Self::Handle => write!(f, "handle link"),
            Self::Video => write!(f, "video link"),
            Self::ShortVideo => write!(f, "short video link"),
            Self::CustomPath => write!(f, "custom path link"),
            Self::Shortened => write!(f, "shortened link"),
        }
    }
}

/// A URL that matched one of the recognised shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    /// Which shape matched.
    pub shape: UrlShape,
    /// The extracted lookup token: a channel ID, handle, video ID, path
    /// segment, or (for shortened links) the whole URL.
    pub token: String,
}

/// Ordered URL-shape matcher.
///
/// All patterns are anchored at the start of the string and tolerate an
/// optional scheme and an optional `www.`; trailing query parameters past
/// the captured token are ignored.
#[derive(Debug)]
pub struct UrlClassifier {
    channel: Regex,
    handle: Regex,
    video: Regex,
    short_video: Regex,
    custom_path: Regex,
}

impl UrlClassifier {
    /// Compile the matcher set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channel: Regex::new(r"^(?:https?://)?(?:www\.)?youtube\.com/channel/([a-zA-Z0-9_-]+)")
                .expect("valid pattern"),
            handle: Regex::new(r"^(?:https?://)?(?:www\.)?youtube\.com/@([a-zA-Z0-9_-]+)")
                .expect("valid pattern"),
            video: Regex::new(r"^(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([a-zA-Z0-9_-]+)")
                .expect("valid pattern"),
            short_video: Regex::new(r"^(?:https?://)?(?:www\.)?youtu\.be/([a-zA-Z0-9_-]+)")
                .expect("valid pattern"),
            custom_path: Regex::new(
                r"^(?:https?://)?(?:www\.)?youtube\.com/(?:c|user|channel|playlist)/([a-zA-Z0-9_-]+)",
            )
            .expect("valid pattern"),
        }
    }

    /// Match `url` against the shapes in precedence order.
    ///
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn classify(&self, url: &str) -> Option<ClassifiedUrl> {
        let ordered = [
            (UrlShape::Channel, &self.channel),
            (UrlShape::Handle, &self.handle),
            (UrlShape::Video, &self.video),
            (UrlShape::ShortVideo, &self.short_video),
            (UrlShape::CustomPath, &self.custom_path),
        ];

        for (shape, pattern) in ordered {
            if let Some(captures) = pattern.captures(url)
                && let Some(token) = captures.get(1)
            {
                return Some(ClassifiedUrl {
                    shape,
                    token: token.as_str().to_string(),
                });
            }
        }

        // Shorteners hide the path, so the whole URL becomes the token.
        if SHORTENER_DOMAINS.iter().any(|domain| url.contains(domain)) {
            return Some(ClassifiedUrl {
                shape: UrlShape::Shortened,
                token: url.to_string(),
            });
        }

        None
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of resolving one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The URL maps to this channel.
    Resolved(ChannelId),
    /// The URL matches no known shape, or its lookup came back empty.
    Unresolvable,
}

impl Resolution {
    /// True when a channel ID was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Resolves channel URLs through classification plus API lookups.
#[derive(Debug, Default)]
pub struct UrlResolver {
    classifier: UrlClassifier,
}

impl UrlResolver {
    /// Create a resolver with the standard matcher set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifier: UrlClassifier::new(),
        }
    }

    /// Resolve `url` to a channel ID, calling the API when the shape
    /// requires it.
    ///
    /// Empty lookup results and not-found answers become
    /// [`Resolution::Unresolvable`]; only real failures propagate.
    ///
    /// # Errors
    ///
    /// Returns an error if an API lookup fails with anything other than
    /// not-found.
    pub fn resolve<A: YouTubeApi>(&self, api: &mut A, url: &str) -> Result<Resolution> {
        let Some(classified) = self.classifier.classify(url) else {
            info!(url, "URL matches no known shape, unresolvable");
            return Ok(Resolution::Unresolvable);
        };

        debug!(url, shape = %classified.shape, token = %classified.token, "classified URL");

        let lookup = match classified.shape {
            UrlShape::Channel => {
                let id = ChannelId::new(classified.token);
                info!(url, channel_id = %id, "resolved directly from channel link");
                return Ok(Resolution::Resolved(id));
            }
            UrlShape::Handle | UrlShape::CustomPath | UrlShape::Shortened => {
                api.search_channel(&classified.token)
            }
            UrlShape::Video | UrlShape::ShortVideo => api.video_channel(&classified.token),
        };

        let resolution = match lookup {
            Ok(Some(id)) => {
                info!(url, shape = %classified.shape, channel_id = %id, "resolved channel URL");
                Resolution::Resolved(id)
            }
            Ok(None) => {
                info!(url, shape = %classified.shape, "lookup came back empty, unresolvable");
                Resolution::Unresolvable
            }
            Err(e) if e.is_not_found() => {
                info!(url, shape = %classified.shape, "lookup target not found, unresolvable");
                Resolution::Unresolvable
            }
            Err(e) => return Err(e.into()),
        };

        Ok(resolution)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::youtube::MockYouTubeApi;

    // =============================================================================
    // Classification
    // =============================================================================

    fn classify(url: &str) -> Option<ClassifiedUrl> {
        UrlClassifier::new().classify(url)
    }

    #[test]
    fn test_classify_channel_link() {
        let classified = classify("https://www.youtube.com/channel/UCabc_-123").expect("match");
        assert_eq!(classified.shape, UrlShape::Channel);
        assert_eq!(classified.token, "UCabc_-123");
    }

    #[test]
    fn test_classify_tolerates_missing_scheme_and_www() {
        for url in [
            "youtube.com/channel/UCxyz",
            "www.youtube.com/channel/UCxyz",
            "http://youtube.com/channel/UCxyz",
            "https://youtube.com/channel/UCxyz",
        ] {
            let classified = classify(url).expect("match");
            assert_eq!(classified.shape, UrlShape::Channel, "url: {url}");
            assert_eq!(classified.token, "UCxyz");
        }
    }

    #[test]
    fn test_classify_ignores_trailing_query() {
        let classified =
            classify("https://www.youtube.com/channel/UCabc?si=tracking").expect("match");
        assert_eq!(classified.token, "UCabc");
    }

    #[test]
    fn test_classify_handle() {
        let classified = classify("https://www.youtube.com/@SomeCreator").expect("match");
        assert_eq!(classified.shape, UrlShape::Handle);
        assert_eq!(classified.token, "SomeCreator");
    }

    #[test]
    fn test_classify_watch_url() {
        let classified =
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ").expect("match");
        assert_eq!(classified.shape, UrlShape::Video);
        assert_eq!(classified.token, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_classify_short_video_url() {
        let classified = classify("https://youtu.be/dQw4w9WgXcQ").expect("match");
        assert_eq!(classified.shape, UrlShape::ShortVideo);
        assert_eq!(classified.token, "dQw4w9WgXcQ");

        let classified = classify("www.youtu.be/dQw4w9WgXcQ").expect("match");
        assert_eq!(classified.shape, UrlShape::ShortVideo);
    }

    #[test]
    fn test_classify_custom_paths() {
        for (url, token) in [
            ("https://www.youtube.com/c/SomeStudio", "SomeStudio"),
            ("youtube.com/user/oldschoolname", "oldschoolname"),
            ("https://youtube.com/playlist/PLxyz", "PLxyz"),
        ] {
            let classified = classify(url).expect("match");
            assert_eq!(classified.shape, UrlShape::CustomPath, "url: {url}");
            assert_eq!(classified.token, token);
        }
    }

    #[test]
    fn test_channel_rule_wins_over_custom_path() {
        // `/channel/` appears in both patterns; precedence picks the direct one.
        let classified = classify("https://www.youtube.com/channel/UCdirect").expect("match");
        assert_eq!(classified.shape, UrlShape::Channel);
    }

    #[test]
    fn test_classify_shortened_link() {
        let classified = classify("https://bit.ly/3xYzAbc").expect("match");
        assert_eq!(classified.shape, UrlShape::Shortened);
        assert_eq!(classified.token, "https://bit.ly/3xYzAbc");

        let classified = classify("http://tinyurl.com/some-channel").expect("match");
        assert_eq!(classified.shape, UrlShape::Shortened);
    }

    #[test]
    fn test_shape_rules_win_over_shortener_substring() {
        // Contains "bit.ly" but is a well-formed channel link.
        let classified =
            classify("https://www.youtube.com/channel/UCabc?from=bit.ly").expect("match");
        assert_eq!(classified.shape, UrlShape::Channel);
        assert_eq!(classified.token, "UCabc");
    }

    #[test]
    fn test_classify_rejects_unknown_shapes() {
        for url in [
            "https://example.com/channel/UCabc",
            "https://www.youtube.com/feed/trending",
            "not a url at all",
            "https://vimeo.com/somebody",
            "",
        ] {
            assert!(classify(url).is_none(), "url should not classify: {url}");
        }
    }

    #[test]
    fn test_anchoring_rejects_embedded_links() {
        // The shapes must match from the start of the cell text.
        assert!(classify("see https://www.youtube.com/channel/UCabc").is_none());
    }

    // =============================================================================
    // Resolution
    // =============================================================================

    #[test]
    fn test_resolve_channel_link_needs_no_api() {
        // Any API call would trip the mock's zero expectations.
        let mut api = MockYouTubeApi::new();
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "https://youtube.com/channel/XYZ123")
            .expect("Should resolve");

        assert_eq!(resolution, Resolution::Resolved(ChannelId::new("XYZ123")));
    }

    #[test]
    fn test_resolve_handle_through_search() {
        let mut api = MockYouTubeApi::new();
        api.expect_search_channel()
            .withf(|query| query == "SomeCreator")
            .times(1)
            .returning(|_| Ok(Some(ChannelId::new("UCfound"))));
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "https://www.youtube.com/@SomeCreator")
            .expect("Should resolve");

        assert_eq!(resolution, Resolution::Resolved(ChannelId::new("UCfound")));
    }

    #[test]
    fn test_resolve_handle_with_empty_search_is_unresolvable() {
        let mut api = MockYouTubeApi::new();
        api.expect_search_channel().returning(|_| Ok(None));
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "youtube.com/@nobody")
            .expect("Should not error");

        assert_eq!(resolution, Resolution::Unresolvable);
    }

    #[test]
    fn test_resolve_video_link_through_owner_lookup() {
        let mut api = MockYouTubeApi::new();
        api.expect_video_channel()
            .withf(|video_id| video_id == "dQw4w9WgXcQ")
            .times(1)
            .returning(|_| Ok(Some(ChannelId::new("UCowner"))));
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "https://youtu.be/dQw4w9WgXcQ")
            .expect("Should resolve");

        assert_eq!(resolution, Resolution::Resolved(ChannelId::new("UCowner")));
    }

    #[test]
    fn test_resolve_shortened_link_searches_whole_url() {
        let mut api = MockYouTubeApi::new();
        api.expect_search_channel()
            .withf(|query| query == "https://bit.ly/3xYzAbc")
            .times(1)
            .returning(|_| Ok(Some(ChannelId::new("UCshort"))));
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "https://bit.ly/3xYzAbc")
            .expect("Should resolve");

        assert_eq!(resolution, Resolution::Resolved(ChannelId::new("UCshort")));
    }

    #[test]
    fn test_resolve_unknown_shape_is_unresolvable_without_api() {
        let mut api = MockYouTubeApi::new();
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "https://example.com/whatever")
            .expect("Should not error");

        assert_eq!(resolution, Resolution::Unresolvable);
    }

    #[test]
    fn test_resolve_maps_not_found_to_unresolvable() {
        let mut api = MockYouTubeApi::new();
        api.expect_video_channel()
            .returning(|_| Err(ApiError::not_found("video gone")));
        let resolver = UrlResolver::new();

        let resolution = resolver
            .resolve(&mut api, "youtube.com/watch?v=deleted0000")
            .expect("Should not error");

        assert_eq!(resolution, Resolution::Unresolvable);
    }

    #[test]
    fn test_resolve_propagates_real_failures() {
        let mut api = MockYouTubeApi::new();
        api.expect_search_channel().returning(|_| {
            Err(ApiError::Status {
                status: 500,
                message: "backend unavailable".to_string(),
            })
        });
        let resolver = UrlResolver::new();

        let result = resolver.resolve(&mut api, "youtube.com/@whoever");
        assert!(result.is_err());
    }
}
