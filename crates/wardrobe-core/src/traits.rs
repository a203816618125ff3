//! Core traits for the attribute catalog and item tagging.
//!
//! These traits define the interfaces that concrete stores must satisfy.
//! `wardrobe-db` implements them on PostgreSQL; `memory` (behind the
//! `test-utils` feature) implements them in memory for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::seasons::Season;

// =============================================================================
// ATTRIBUTE CATALOG
// =============================================================================

/// Per-kind catalog of user-owned attributes, plus the merged option list.
///
/// Each method runs on a single pooled connection in the PostgreSQL store.
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// Kind this catalog serves.
    fn kind(&self) -> AttributeKind;

    /// List a user's entries.
    ///
    /// With `active_only`, only active rows sorted case-insensitively by name.
    /// Otherwise active rows first, then inactive, each group sorted by name.
    async fn list(&self, user_id: Uuid, active_only: bool) -> Result<Vec<UserAttribute>>;

    /// Create an entry, or reactivate the existing one with the same
    /// normalized name. Never surfaces a uniqueness error.
    async fn create(&self, user_id: Uuid, name: &str) -> Result<UserAttribute>;

    /// Rename an entry and re-resolve its master mapping.
    /// Returns `false` if the entry does not exist.
    async fn rename(&self, attribute_id: Uuid, name: &str) -> Result<bool>;

    /// Activate or deactivate an entry. Returns `false` if it does not exist.
    async fn set_active(&self, attribute_id: Uuid, is_active: bool) -> Result<bool>;

    /// Hard-delete an entry owned by `requesting_user_id`.
    ///
    /// Returns `false` if it does not exist, `Forbidden` for a non-owner and
    /// `Conflict` while any item still links to it.
    async fn delete(&self, attribute_id: Uuid, requesting_user_id: Uuid) -> Result<bool>;

    /// Master entries merged with the user's entries, one per normalized name.
    async fn options(&self, user_id: Uuid, active_only: bool) -> Result<Vec<AttributeOption>>;
}

// =============================================================================
// TAG ASSOCIATION
// =============================================================================

/// Upsert-or-link of free-text tags onto items.
#[async_trait]
pub trait TagLinkRepository: Send + Sync {
    /// Ensure a user attribute exists for each name, then link it to the item.
    ///
    /// Idempotent. On an existing `(user, normalized name)` the stored name is
    /// overwritten with the supplied spelling; the active flag is untouched.
    /// Existing links are left alone. No-op for an empty list.
    async fn ensure_and_link(
        &self,
        kind: AttributeKind,
        item_id: Uuid,
        user_id: Uuid,
        names: &[String],
    ) -> Result<()>;

    /// Names of the attributes of `kind` linked to the item, sorted by name.
    async fn names_for_item(&self, kind: AttributeKind, item_id: Uuid) -> Result<Vec<String>>;
}

/// Links between items and the fixed season vocabulary.
#[async_trait]
pub trait SeasonLinkRepository: Send + Sync {
    /// Link recognized seasons; unknown labels are skipped silently.
    async fn link(&self, item_id: Uuid, labels: &[String]) -> Result<()>;

    /// Remove every season link of the item, then link `labels`.
    async fn replace(&self, item_id: Uuid, labels: &[String]) -> Result<()>;

    /// Seasons linked to the item, in vocabulary order.
    async fn seasons_for_item(&self, item_id: Uuid) -> Result<Vec<Season>>;
}
