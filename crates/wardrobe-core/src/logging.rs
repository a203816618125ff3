//! Structured logging field name constants.
//!
//! Both crates use these names for `tracing` fields so log aggregation can
//! query catalog, merge and tagging events the same way.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Tag sync gave up, item left with incomplete tags |
//! | WARN  | Transient store failure being retried, missing season rows |
//! | INFO  | Lifecycle events (pool, migrations, seeding), attribute deletes |
//! | DEBUG | Operation completions, skipped season labels |
//! | TRACE | Per-tag upsert/link statements |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "catalog", "tagging", "admin"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "attributes", "options", "item_tags", "seasons"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "rename", "delete", "ensure_and_link", "on_update"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Attribute kind ("color", "material", "occasion").
pub const KIND: &str = "kind";

/// Owning or requesting user.
pub const USER_ID: &str = "user_id";

/// Clothing item being tagged.
pub const ITEM_ID: &str = "item_id";

/// User attribute row being operated on.
pub const ATTRIBUTE_ID: &str = "attribute_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows or options returned.
pub const RESULT_COUNT: &str = "result_count";

/// Number of tag names processed.
pub const TAG_COUNT: &str = "tag_count";

/// Attempt number within a retry loop (1-based).
pub const ATTEMPT: &str = "attempt";

/// Backoff sleep before the next attempt, in milliseconds.
pub const BACKOFF_MS: &str = "backoff_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
