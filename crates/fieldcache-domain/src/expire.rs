//! Expiration normalization
//!
//! Heterogeneous expiry inputs are normalized to an absolute unix
//! timestamp before they reach a backend. Two default policies coexist,
//! deliberately:
//!
//! - the facade resolves "no expiry given" ([`Expire::Default`], and an
//!   explicit `At(0)` at the facade boundary) to [`DEFAULT_TTL_SECS`]
//!   (3 days) from now;
//! - a raw backend `set_raw` handed absolute expiry `0` applies
//!   [`PERMANENT_TTL_SECS`] (1 year) via [`effective_expiry`].
//!
//! Any non-negative integer is an absolute timestamp, never a relative
//! duration. Callers wanting "N seconds from now" add the clock's
//! current time themselves.

use crate::clock::Clock;
use crate::constants::{DEFAULT_TTL_SECS, PERMANENT_TTL_SECS};
use crate::error::{Error, Result};
use std::time::Duration;

/// Expiry input accepted by the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expire {
    /// No expiry given; the facade applies its 3-day default
    #[default]
    Default,
    /// End of the current calendar day, local time, through 23:59:59
    Today,
    /// Absolute unix timestamp; negative values are rejected, `0` means
    /// "use the default policy"
    At(i64),
}

impl Expire {
    /// Normalize to an absolute unix timestamp
    pub fn resolve(&self, clock: &dyn Clock) -> Result<i64> {
        match *self {
            Expire::Default | Expire::At(0) => Ok(clock.now_unix() + DEFAULT_TTL_SECS),
            Expire::Today => Ok(clock.end_of_today_unix()),
            Expire::At(ts) if ts < 0 => Err(Error::invalid_expiry(format!(
                "expiry timestamp must be non-negative, got {ts}"
            ))),
            Expire::At(ts) => Ok(ts),
        }
    }
}

/// Backend-level expiry defaulting: absolute expiry `0` means "long-lived"
/// (1 year from now); anything else passes through unchanged
pub fn effective_expiry(expires_at: i64, now: i64) -> i64 {
    if expires_at == 0 {
        now + PERMANENT_TTL_SECS
    } else {
        expires_at
    }
}

/// Remaining TTL for native-TTL backends, or `None` when the entry is
/// already past its deadline (born expired; store nothing)
pub fn remaining_ttl(expires_at: i64, now: i64) -> Option<Duration> {
    let deadline = effective_expiry(expires_at, now);
    if deadline <= now {
        None
    } else {
        Some(Duration::from_secs((deadline - now) as u64))
    }
}
