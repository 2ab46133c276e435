//! API key pool with rotation.
//!
//! Holds one HTTP client per configured YouTube Data API key, in the order
//! the keys were configured, plus a cursor marking the active key. Rotation
//! advances the cursor circularly; wrapping back to the first key is the
//! signal that every credential has been tried (see
//! [`crate::executor::ApiExecutor`], which sleeps on that signal).
//!
//! The pool is a plain owned value mutated through `&mut self`, so rotation
//! and reads cannot interleave: the whole pipeline is single-threaded and the
//! borrow checker enforces exclusive access.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{ApiError, Error, Result};

/// One YouTube Data API key bound to its own HTTP client.
///
/// Each credential gets its own client so that rotation swaps the whole
/// client, not just a query parameter buried in shared state.
pub struct KeyedClient {
    key: String,
    http: reqwest::blocking::Client,
}

impl KeyedClient {
    fn new(key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { key, http })
    }

    /// The API key this client authenticates with.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The blocking HTTP client bound to this key.
    #[must_use]
    pub const fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }
}

impl fmt::Debug for KeyedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs and panics.
        f.debug_struct("KeyedClient")
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Ordered pool of credential-bound API clients with a rotation cursor.
#[derive(Debug)]
pub struct KeyPool {
    clients: Vec<KeyedClient>,
    cursor: usize,
}

impl KeyPool {
    /// Build a pool from configured API keys, one HTTP client per key.
    ///
    /// The cursor starts at the first key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `keys` is empty or contains a blank
    /// entry, or an API transport error if an HTTP client cannot be
    /// constructed.
    pub fn new(keys: Vec<String>, timeout: Duration) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::Configuration(
                "cannot build a key pool from an empty key list".to_string(),
            ));
        }
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(Error::Configuration(
                "API keys must not be blank".to_string(),
            ));
        }

        let clients = keys
            .into_iter()
            .map(|key| KeyedClient::new(key, timeout))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            clients,
            cursor: 0,
        })
    }

    /// The client bound to the currently active key. Never rotates.
    #[must_use]
    pub fn active(&self) -> &KeyedClient {
        &self.clients[self.cursor]
    }

    /// Advance the cursor to the next key, wrapping after the last one.
    ///
    /// Returns the new 1-based position, matching how operators count keys.
    pub fn rotate(&mut self) -> usize {
        self.cursor = (self.cursor + 1) % self.clients.len();
        let position = self.cursor + 1;
        debug!(
            position,
            total = self.clients.len(),
            "rotated to next API key"
        );
        position
    }

    /// True exactly when the cursor points at the first key.
    ///
    /// Immediately after a rotation this means the pool has wrapped: every
    /// key was tried and found exhausted.
    #[must_use]
    pub const fn has_cycled_to_start(&self) -> bool {
        self.cursor == 0
    }

    /// 1-based position of the active key.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor + 1
    }

    /// Number of keys in the pool.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.clients.len()
    }
}
