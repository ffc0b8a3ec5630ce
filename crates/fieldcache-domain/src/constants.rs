//! Shared constants

/// Default TTL applied by the facade when no expiry is given (3 days)
pub const DEFAULT_TTL_SECS: i64 = 259_200;

/// TTL applied at the raw backend layer when handed absolute expiry `0`
/// (1 year); see `expire::effective_expiry`
pub const PERMANENT_TTL_SECS: i64 = 31_536_000;

/// Reserved key prefix under which a field's tracked member keys are stored
pub const FIELD_PREFIX: &str = "Field:";
