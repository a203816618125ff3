//! Error types for the wardrobe attribute taxonomy.

use thiserror::Error;
use uuid::Uuid;

use crate::models::TagField;

/// Result type alias using the wardrobe Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalog, merge and tagging operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input, e.g. a blank attribute name
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authenticated but not allowed to touch the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation conflicts with existing state (attribute still in use, name taken)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Tag synchronisation for an item failed partway.
    ///
    /// The item row itself is already committed; the caller may retry the
    /// tag sync since every step is an upsert.
    #[error("Tagging item {item_id} failed on {field}: {source}")]
    ItemTagging {
        item_id: Uuid,
        field: TagField,
        #[source]
        source: Box<Error>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a failure that happened while syncing `field` for `item_id`.
    pub fn item_tagging(item_id: Uuid, field: TagField, source: Error) -> Self {
        Error::ItemTagging {
            item_id,
            field,
            source: Box::new(source),
        }
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Covers pool exhaustion, dropped connections, and the serialization /
    /// deadlock SQLSTATEs. Everything else (validation, ownership, constraint
    /// violations) fails the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Database(err) => match err {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
                sqlx::Error::Database(db_err) => {
                    matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
                }
                _ => false,
            },
            Error::ItemTagging { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("name must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: name must not be empty");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("not the owner".to_string());
        assert_eq!(err.to_string(), "Forbidden: not the owner");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("color is used by items".to_string());
        assert_eq!(err.to_string(), "Conflict: color is used by items");
    }

    #[test]
    fn test_item_tagging_wraps_source() {
        let id = Uuid::nil();
        let err = Error::item_tagging(id, TagField::Colors, Error::Internal("boom".into()));
        let msg = err.to_string();
        assert!(msg.contains(&id.to_string()));
        assert!(msg.contains("colors"));
        assert!(msg.contains("Internal error: boom"));

        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(Error::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(Error::Database(sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        assert!(!Error::Database(sqlx::Error::RowNotFound).is_transient());
    }

    #[test]
    fn test_domain_errors_are_not_transient() {
        assert!(!Error::InvalidInput("x".into()).is_transient());
        assert!(!Error::Forbidden("x".into()).is_transient());
        assert!(!Error::Conflict("x".into()).is_transient());
    }

    #[test]
    fn test_item_tagging_transient_follows_source() {
        let id = Uuid::new_v4();
        let transient =
            Error::item_tagging(id, TagField::Seasons, Error::Database(sqlx::Error::PoolTimedOut));
        assert!(transient.is_transient());

        let permanent = Error::item_tagging(id, TagField::Seasons, Error::InvalidInput("x".into()));
        assert!(!permanent.is_transient());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
