//! Channelsheet Core Library
//!
//! This crate provides the core functionality for the Channelsheet
//! application:
//! - `YouTube` channel URL resolution (channel links, handles, video links,
//!   legacy custom paths, shortener links)
//! - Channel metadata aggregation (description, subscriber / video / view
//!   counts, latest upload title) with fixed placeholders for missing data
//! - Quota-aware API execution over a rotating pool of API keys
//! - A sheet abstraction with a CSV backend, plus the row-by-row enrichment
//!   loop tying it all together
//!
//! # Error Handling
//!
//! This crate uses typed errors per domain; quota exhaustion is handled
//! internally by the executor and never surfaces to callers. See the
//! [`error`] module for details.
//!
//! ```rust,ignore
//! use channelsheet_core::{Error, Result};
//!
//! fn do_something() -> Result<()> {
//!     // Your code here
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod enrich;
pub mod error;
pub mod executor;
pub mod pool;
pub mod resolver;
pub mod sheet;
pub mod youtube;

pub use channel::{
    ChannelRecord, DATA_NOT_FOUND, DESCRIPTION_ABSENT, NOT_AVAILABLE, aggregate,
};
pub use config::{AppConfig, default_config_path};
pub use enrich::{EnrichOptions, EnrichStats, INVALID_URL_MARKER, SheetEnricher};
pub use error::{ApiError, ApiResult, Error, Result, SheetError};
pub use executor::ApiExecutor;
pub use pool::{KeyPool, KeyedClient};
pub use resolver::{ClassifiedUrl, Resolution, UrlClassifier, UrlResolver, UrlShape};
pub use sheet::{CsvSheet, SheetTable};
pub use youtube::{API_BASE_URL, ChannelDetails, ChannelId, YouTubeApi, YouTubeDataApi};
