//! # fieldcache - Domain Layer
//!
//! Core types for the fieldcache facade: the error taxonomy, the
//! [`CacheBackend`] port every storage backend implements, the [`Expire`]
//! normalization model, and the injectable [`Clock`] used to make expiry
//! behavior deterministic under test.
//!
//! This crate performs no I/O. Backend implementations live in
//! `fieldcache-providers`; the facade and registry live in `fieldcache`.

/// Error taxonomy and `Result` alias
pub mod error;

/// Shared constants (default TTLs, reserved key prefixes)
pub mod constants;

/// Injectable clock port
pub mod clock;

/// Expiration normalization
pub mod expire;

/// Port traits implemented by storage backends
pub mod ports;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use expire::Expire;
pub use ports::{field_key, BackendKind, CacheBackend};
