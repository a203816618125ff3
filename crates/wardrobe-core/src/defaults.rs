//! Centralized default constants.
//!
//! Shared default values live here so the store, the orchestrator and the
//! admin binary agree on them.

// =============================================================================
// LABELS
// =============================================================================

/// Maximum characters in an attribute name.
pub const MAX_LABEL_LEN: usize = 50;

// =============================================================================
// DATABASE POOL
// =============================================================================

/// Maximum number of connections in the pool.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Minimum number of connections kept open.
pub const DB_MIN_CONNECTIONS: u32 = 1;

/// Seconds to wait for a pooled connection.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Seconds before an idle connection is closed.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Maximum connection lifetime in seconds (30 minutes).
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// TAG SYNC RETRY
// =============================================================================

/// Attempts made for one item tag sync before giving up (first try included).
pub const TAG_SYNC_MAX_ATTEMPTS: u32 = 3;

/// Backoff before the second attempt, in milliseconds.
pub const TAG_SYNC_INITIAL_BACKOFF_MS: u64 = 50;

/// Upper bound on a single backoff sleep, in milliseconds.
pub const TAG_SYNC_MAX_BACKOFF_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_bounds_are_consistent() {
        assert!(DB_MIN_CONNECTIONS <= DB_MAX_CONNECTIONS);
    }

    #[test]
    fn test_backoff_bounds_are_consistent() {
        assert!(TAG_SYNC_MAX_ATTEMPTS >= 1);
        assert!(TAG_SYNC_INITIAL_BACKOFF_MS <= TAG_SYNC_MAX_BACKOFF_MS);
    }
}
