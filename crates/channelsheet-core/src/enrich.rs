//! Sheet enrichment run loop.
//!
//! Walks the sheet row by row, resolves each URL to a channel, aggregates
//! the channel's metadata, and writes it back. Strictly sequential: one row
//! at a time, one API call at a time, with a fixed pause after every
//! enriched row so the pipeline stays inside request-rate limits.
//!
//! Per-row outcomes:
//! - blank URL cell: skipped entirely, nothing read from the API, nothing
//!   written, no pause;
//! - unresolvable URL: a single [`INVALID_URL_MARKER`] write, no pause;
//! - resolved channel: five metadata cells written unconditionally, then the
//!   pause.
//!
//! Any error that reaches this loop stops the run; completed rows are
//! already persisted by the sheet backend.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::channel::aggregate;
use crate::config::AppConfig;
use crate::error::Result;
use crate::resolver::{Resolution, UrlResolver};
use crate::sheet::SheetTable;
use crate::youtube::YouTubeApi;

/// Marker written to a row whose URL cannot be resolved to a channel.
pub const INVALID_URL_MARKER: &str = "Invalid URL";

/// Layout and pacing for an enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// First 1-based row to process.
    pub start_row: usize,
    /// 1-based column holding the channel URL.
    pub url_column: usize,
    /// First 1-based column the five metadata values go to.
    pub output_column: usize,
    /// 1-based column receiving the [`INVALID_URL_MARKER`].
    pub marker_column: usize,
    /// Pause after each enriched row.
    pub row_delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            start_row: 2,
            url_column: 2,
            output_column: 3,
            marker_column: 6,
            row_delay: Duration::from_secs(5),
        }
    }
}

impl EnrichOptions {
    /// Build options from the application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            start_row: config.start_row,
            url_column: config.url_column,
            output_column: config.output_column,
            marker_column: config.marker_column,
            row_delay: config.row_delay(),
        }
    }

    /// Override the inter-row pause.
    #[must_use]
    pub const fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay;
        self
    }

    /// Override the first processed row.
    #[must_use]
    pub const fn with_start_row(mut self, row: usize) -> Self {
        self.start_row = row;
        self
    }
}

/// Counters describing one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichStats {
    /// Rows visited.
    pub rows_scanned: usize,
    /// Rows skipped for a blank URL cell.
    pub rows_skipped: usize,
    /// Rows marked with the invalid-URL marker.
    pub rows_invalid: usize,
    /// Rows that received a full metadata record.
    pub rows_enriched: usize,
}

/// Drives URL resolution and metadata aggregation across a sheet.
#[derive(Debug)]
pub struct SheetEnricher<A> {
    api: A,
    resolver: UrlResolver,
    options: EnrichOptions,
}

impl<A: YouTubeApi> SheetEnricher<A> {
    /// Create an enricher over an API client.
    #[must_use]
    pub fn new(api: A, options: EnrichOptions) -> Self {
        Self {
            api,
            resolver: UrlResolver::new(),
            options,
        }
    }

    /// The wrapped API client, e.g. for reading executor counters.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Process every row from the configured start row to the last
    /// populated row.
    ///
    /// # Errors
    ///
    /// Returns the first sheet failure or non-recoverable API failure;
    /// rows already written stay written.
    pub fn run<S: SheetTable>(&mut self, sheet: &mut S) -> Result<EnrichStats> {
        let mut stats = EnrichStats::default();
        let last_row = sheet.last_row();
        info!(
            start_row = self.options.start_row,
            last_row, "starting enrichment run"
        );

        for row in self.options.start_row..=last_row {
            stats.rows_scanned += 1;

            let Some(url) = sheet.cell(row, self.options.url_column)? else {
                debug!(row, "blank URL cell, skipping row");
                stats.rows_skipped += 1;
                continue;
            };

            match self.resolver.resolve(&mut self.api, &url)? {
                Resolution::Unresolvable => {
                    info!(row, url = %url, "URL did not resolve, marking row");
                    sheet.update_cell(row, self.options.marker_column, INVALID_URL_MARKER)?;
                    stats.rows_invalid += 1;
                    // No pause: the marker write used no API quota.
                }
                Resolution::Resolved(id) => {
                    let record = aggregate(&mut self.api, &id)?;
                    debug!(row, channel_id = %id, "writing metadata record");
                    for (offset, value) in record.values().into_iter().enumerate() {
                        sheet.update_cell(row, self.options.output_column + offset, value)?;
                    }
                    stats.rows_enriched += 1;
                    thread::sleep(self.options.row_delay);
                }
            }
        }

        info!(
            scanned = stats.rows_scanned,
            skipped = stats.rows_skipped,
            invalid = stats.rows_invalid,
            enriched = stats.rows_enriched,
            "enrichment run complete"
        );
        Ok(stats)
    }
}
