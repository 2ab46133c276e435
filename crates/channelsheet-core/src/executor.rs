//! Quota-aware API call execution.
//!
//! Wraps every YouTube Data API request in a retry loop that survives per-key
//! quota exhaustion:
//!
//! - a call that fails with [`ApiError::QuotaExceeded`] rotates the key pool
//!   and is retried against the next key;
//! - when rotation wraps back to the first key, every credential is spent,
//!   so the executor sleeps for the configured backoff before retrying;
//! - every other failure propagates immediately, untouched.
//!
//! The loop has no retry cap. Quota pressure is an operational condition to
//! wait out, not an error to surface, so `QuotaExceeded` never escapes
//! [`ApiExecutor::execute`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use channelsheet_core::{ApiExecutor, KeyPool};
//!
//! # fn main() -> channelsheet_core::Result<()> {
//! let pool = KeyPool::new(vec!["key-a".into(), "key-b".into()], Duration::from_secs(30))?;
//! let mut executor = ApiExecutor::new(pool, Duration::from_secs(3600));
//! let status = executor.execute(|client| {
//!     // Build a fresh request against the active client on every attempt.
//!     Ok(client.key().len())
//! })?;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::pool::{KeyPool, KeyedClient};

/// Executes API calls against a rotating key pool.
///
/// Owns the [`KeyPool`] for the lifetime of the process; all requests flow
/// through [`Self::execute`], which is the only place rotation and the
/// full-cycle backoff happen.
#[derive(Debug)]
pub struct ApiExecutor {
    pool: KeyPool,
    backoff: Duration,
    rotations: u64,
    backoffs: u64,
}

impl ApiExecutor {
    /// Create an executor over `pool`, sleeping `backoff` whenever a
    /// rotation wraps the pool back to its first key.
    #[must_use]
    pub const fn new(pool: KeyPool, backoff: Duration) -> Self {
        Self {
            pool,
            backoff,
            rotations: 0,
            backoffs: 0,
        }
    }

    /// Run `call` until it returns anything other than a quota failure.
    ///
    /// The closure receives the currently active [`KeyedClient`] and must
    /// build its request from it on every invocation, so a retry after
    /// rotation is issued with the new credential rather than a stale one.
    ///
    /// # Errors
    ///
    /// Returns whatever non-quota error the call produced. Never returns
    /// [`ApiError::QuotaExceeded`].
    pub fn execute<T, F>(&mut self, mut call: F) -> ApiResult<T>
    where
        F: FnMut(&KeyedClient) -> ApiResult<T>,
    {
        loop {
            match call(self.pool.active()) {
                Ok(value) => return Ok(value),
                Err(ApiError::QuotaExceeded) => {
                    self.rotations += 1;
                    let exhausted = self.pool.position();
                    let next = self.pool.rotate();
                    warn!(
                        exhausted,
                        next,
                        total = self.pool.key_count(),
                        "API key is out of quota, rotating"
                    );

                    if self.pool.has_cycled_to_start() {
                        self.backoffs += 1;
                        info!(
                            backoff_secs = self.backoff.as_secs(),
                            "every API key is quota-exhausted, backing off"
                        );
                        thread::sleep(self.backoff);
                        info!("backoff complete, resuming with the first key");
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Number of key rotations performed since construction.
    #[must_use]
    pub const fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Number of full-cycle backoff sleeps taken since construction.
    #[must_use]
    pub const fn backoffs(&self) -> u64 {
        self.backoffs
    }

    /// The underlying key pool, for position reporting.
    #[must_use]
    pub const fn pool(&self) -> &KeyPool {
        &self.pool
    }
}
