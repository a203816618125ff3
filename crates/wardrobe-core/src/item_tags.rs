//! Tag synchronisation for clothing items.
//!
//! Runs after the item row is written by its own collaborator. Colors,
//! materials and occasions are additive on update (links are only ever
//! added); seasons are replaced wholesale when present.
//!
//! Each sync is retried as a whole on transient store failures. A failure
//! that survives retry surfaces as [`Error::ItemTagging`] naming the first
//! field that failed; the item row stays as written.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{AttributeKind, ItemTagChanges, ItemTagSet, ItemTags, TagField};
use crate::retry::RetryPolicy;
use crate::traits::{SeasonLinkRepository, TagLinkRepository};

/// Composes tag association calls for item create and update.
#[derive(Clone)]
pub struct ItemTagOrchestrator {
    links: Arc<dyn TagLinkRepository>,
    seasons: Arc<dyn SeasonLinkRepository>,
    retry: RetryPolicy,
}

impl ItemTagOrchestrator {
    pub fn new(links: Arc<dyn TagLinkRepository>, seasons: Arc<dyn SeasonLinkRepository>) -> Self {
        Self {
            links,
            seasons,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Link all tags of a freshly created item.
    pub async fn on_create(&self, item_id: Uuid, user_id: Uuid, tags: &ItemTags) -> Result<()> {
        let start = Instant::now();
        let result = self
            .retry
            .run("item_tags.on_create", move || self.sync_create(item_id, user_id, tags))
            .await;
        self.finish("on_create", item_id, user_id, start, result)
    }

    /// Apply the tag fields present in an item update.
    pub async fn on_update(
        &self,
        item_id: Uuid,
        user_id: Uuid,
        changes: &ItemTagChanges,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let result = self
            .retry
            .run("item_tags.on_update", move || {
                self.sync_update(item_id, user_id, changes)
            })
            .await;
        self.finish("on_update", item_id, user_id, start, result)
    }

    /// Read back every tag set currently linked to an item.
    pub async fn tags_for_item(&self, item_id: Uuid) -> Result<ItemTagSet> {
        Ok(ItemTagSet {
            colors: self
                .links
                .names_for_item(AttributeKind::Color, item_id)
                .await?,
            materials: self
                .links
                .names_for_item(AttributeKind::Material, item_id)
                .await?,
            occasions: self
                .links
                .names_for_item(AttributeKind::Occasion, item_id)
                .await?,
            seasons: self.seasons.seasons_for_item(item_id).await?,
        })
    }

    async fn sync_create(&self, item_id: Uuid, user_id: Uuid, tags: &ItemTags) -> Result<()> {
        for kind in AttributeKind::ALL {
            self.links
                .ensure_and_link(kind, item_id, user_id, tags.names(kind))
                .await
                .map_err(|e| Error::item_tagging(item_id, kind.field(), e))?;
        }
        self.seasons
            .link(item_id, &tags.seasons)
            .await
            .map_err(|e| Error::item_tagging(item_id, TagField::Seasons, e))
    }

    async fn sync_update(
        &self,
        item_id: Uuid,
        user_id: Uuid,
        changes: &ItemTagChanges,
    ) -> Result<()> {
        for kind in AttributeKind::ALL {
            if let Some(names) = changes.names(kind) {
                self.links
                    .ensure_and_link(kind, item_id, user_id, names)
                    .await
                    .map_err(|e| Error::item_tagging(item_id, kind.field(), e))?;
            }
        }
        if let Some(seasons) = &changes.seasons {
            self.seasons
                .replace(item_id, seasons)
                .await
                .map_err(|e| Error::item_tagging(item_id, TagField::Seasons, e))?;
        }
        Ok(())
    }

    fn finish(
        &self,
        op: &'static str,
        item_id: Uuid,
        user_id: Uuid,
        start: Instant,
        result: Result<()>,
    ) -> Result<()> {
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => debug!(
                subsystem = "tagging",
                component = "item_tags",
                op,
                %item_id,
                %user_id,
                duration_ms,
                "Item tags synced"
            ),
            Err(e) => error!(
                subsystem = "tagging",
                component = "item_tags",
                op,
                %item_id,
                %user_id,
                duration_ms,
                error = %e,
                "Item tag sync failed; item kept with incomplete tags"
            ),
        }
        result
    }
}
