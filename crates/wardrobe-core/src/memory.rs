//! In-memory store implementing every repository trait.
//!
//! Follows the same upsert, ownership and referential rules as the
//! PostgreSQL store so catalog and orchestration logic can be exercised
//! without a database. Failures can be injected per tag field to drive the
//! retry and error-wrapping paths.
//!
//! Only built for tests and under the `test-utils` feature.
//!
//! ## Usage
//!
//! ```rust
//! use wardrobe_core::memory::InMemoryWardrobe;
//! use wardrobe_core::{AttributeKind, AttributeRepository};
//!
//! # tokio_test_block(async {
//! let store = InMemoryWardrobe::new().with_master(AttributeKind::Color, "Navy");
//! let colors = store.catalog(AttributeKind::Color);
//! let user = uuid::Uuid::new_v4();
//! let navy = colors.create(user, " navy ").await.unwrap();
//! assert!(navy.mapped_master_id.is_some());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::access::AccessDecision;
use crate::error::{Error, Result};
use crate::models::*;
use crate::normalize::{clean_label, clean_tag, normalize_label, same_label};
use crate::options::merge_options;
use crate::seasons::{resolve_seasons, Season};
use crate::traits::{AttributeRepository, SeasonLinkRepository, TagLinkRepository};

/// Shared in-memory wardrobe store.
#[derive(Clone, Default)]
pub struct InMemoryWardrobe {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    masters: HashMap<AttributeKind, Vec<MasterAttribute>>,
    users: HashMap<AttributeKind, Vec<UserAttribute>>,
    links: HashMap<AttributeKind, HashSet<(Uuid, Uuid)>>,
    season_links: HashSet<(Uuid, Season)>,
    failures: HashMap<TagField, InjectedFailure>,
}

#[derive(Debug, Clone, Copy)]
struct InjectedFailure {
    remaining: u32,
    transient: bool,
}

impl State {
    fn master_match(&self, kind: AttributeKind, name: &str) -> Option<Uuid> {
        self.masters
            .get(&kind)
            .and_then(|rows| rows.iter().find(|m| same_label(&m.name, name)))
            .map(|m| m.id)
    }

    fn users_mut(&mut self, kind: AttributeKind) -> &mut Vec<UserAttribute> {
        self.users.entry(kind).or_default()
    }

    fn find_user_row(&self, kind: AttributeKind, attribute_id: Uuid) -> Option<&UserAttribute> {
        self.users
            .get(&kind)
            .and_then(|rows| rows.iter().find(|a| a.id == attribute_id))
    }

    fn take_failure(&mut self, field: TagField) -> Result<()> {
        let Some(failure) = self.failures.get_mut(&field) else {
            return Ok(());
        };
        if failure.remaining == 0 {
            return Ok(());
        }
        failure.remaining -= 1;
        if failure.transient {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Err(Error::Internal(format!("injected failure on {}", field)))
        }
    }

    /// Upsert on `(user, normalized name)`, overwriting the stored name.
    fn upsert_tag(&mut self, kind: AttributeKind, user_id: Uuid, name: &str) -> Uuid {
        let key = normalize_label(name);
        let mapped = self.master_match(kind, name);
        let rows = self.users_mut(kind);
        if let Some(row) = rows
            .iter_mut()
            .find(|a| a.user_id == user_id && normalize_label(&a.name) == key)
        {
            row.name = name.to_string();
            return row.id;
        }
        let row = UserAttribute {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            is_active: true,
            mapped_master_id: mapped,
            created_at_utc: Utc::now(),
        };
        let id = row.id;
        rows.push(row);
        id
    }
}

impl InMemoryWardrobe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an active master entry.
    pub fn with_master(self, kind: AttributeKind, name: &str) -> Self {
        self.add_master(kind, name, true);
        self
    }

    /// Seed an inactive master entry.
    pub fn with_inactive_master(self, kind: AttributeKind, name: &str) -> Self {
        self.add_master(kind, name, false);
        self
    }

    /// Add a master entry and return its id.
    pub fn add_master(&self, kind: AttributeKind, name: &str, is_active: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state()
            .masters
            .entry(kind)
            .or_default()
            .push(MasterAttribute {
                id,
                name: name.to_string(),
                is_active,
            });
        id
    }

    /// Catalog handle for one kind, sharing this store's state.
    pub fn catalog(&self, kind: AttributeKind) -> InMemoryCatalog {
        InMemoryCatalog {
            kind,
            state: Arc::clone(&self.state),
        }
    }

    /// Make the next `times` writes for `field` fail. Transient failures look
    /// like a pool timeout; permanent ones are [`Error::Internal`].
    pub fn fail_next(&self, field: TagField, times: u32, transient: bool) {
        self.state().failures.insert(
            field,
            InjectedFailure {
                remaining: times,
                transient,
            },
        );
    }

    /// Number of user attribute rows of `kind` owned by `user_id`.
    pub fn attribute_count(&self, kind: AttributeKind, user_id: Uuid) -> usize {
        self.state()
            .users
            .get(&kind)
            .map(|rows| rows.iter().filter(|a| a.user_id == user_id).count())
            .unwrap_or(0)
    }

    /// Number of link rows of `kind` for an item.
    pub fn link_count(&self, kind: AttributeKind, item_id: Uuid) -> usize {
        self.state()
            .links
            .get(&kind)
            .map(|links| links.iter().filter(|(item, _)| *item == item_id).count())
            .unwrap_or(0)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Per-kind catalog view over an [`InMemoryWardrobe`].
#[derive(Clone)]
pub struct InMemoryCatalog {
    kind: AttributeKind,
    state: Arc<Mutex<State>>,
}

impl InMemoryCatalog {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AttributeRepository for InMemoryCatalog {
    fn kind(&self) -> AttributeKind {
        self.kind
    }

    async fn list(&self, user_id: Uuid, active_only: bool) -> Result<Vec<UserAttribute>> {
        let state = self.state();
        let mut rows: Vec<UserAttribute> = state
            .users
            .get(&self.kind)
            .map(|rows| {
                rows.iter()
                    .filter(|a| a.user_id == user_id && (!active_only || a.is_active))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| {
            b.is_active
                .cmp(&a.is_active)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(rows)
    }

    async fn create(&self, user_id: Uuid, name: &str) -> Result<UserAttribute> {
        let clean = clean_label(name)?;
        let key = normalize_label(&clean);
        let mut state = self.state();
        let mapped = state.master_match(self.kind, &clean);
        let rows = state.users_mut(self.kind);

        if let Some(row) = rows
            .iter_mut()
            .find(|a| a.user_id == user_id && normalize_label(&a.name) == key)
        {
            row.is_active = true;
            return Ok(row.clone());
        }

        let row = UserAttribute {
            id: Uuid::new_v4(),
            user_id,
            name: clean,
            is_active: true,
            mapped_master_id: mapped,
            created_at_utc: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn rename(&self, attribute_id: Uuid, name: &str) -> Result<bool> {
        let clean = clean_label(name)?;
        let key = normalize_label(&clean);
        let kind = self.kind;
        let mut state = self.state();
        let Some(owner) = state.find_user_row(kind, attribute_id).map(|a| a.user_id) else {
            return Ok(false);
        };
        let mapped = state.master_match(kind, &clean);
        let rows = state.users_mut(kind);

        let taken = rows.iter().any(|a| {
            a.id != attribute_id && a.user_id == owner && normalize_label(&a.name) == key
        });
        if taken {
            return Err(Error::Conflict(format!(
                "A {} named '{}' already exists",
                kind, clean
            )));
        }

        if let Some(row) = rows.iter_mut().find(|a| a.id == attribute_id) {
            row.name = clean;
            row.mapped_master_id = mapped;
        }
        Ok(true)
    }

    async fn set_active(&self, attribute_id: Uuid, is_active: bool) -> Result<bool> {
        let mut state = self.state();
        match state
            .users_mut(self.kind)
            .iter_mut()
            .find(|a| a.id == attribute_id)
        {
            Some(row) => {
                row.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, attribute_id: Uuid, requesting_user_id: Uuid) -> Result<bool> {
        let kind = self.kind;
        let mut state = self.state();
        let Some(owner) = state.find_user_row(kind, attribute_id).map(|a| a.user_id) else {
            return Ok(false);
        };

        AccessDecision::evaluate(owner, requesting_user_id).require(kind.as_str())?;

        let in_use = state
            .links
            .get(&kind)
            .is_some_and(|links| links.iter().any(|(_, attr)| *attr == attribute_id));
        if in_use {
            return Err(Error::Conflict(format!(
                "This {} is used by items. Disable it instead.",
                kind
            )));
        }

        let rows = state.users_mut(kind);
        let before = rows.len();
        rows.retain(|a| a.id != attribute_id);
        Ok(rows.len() < before)
    }

    async fn options(&self, user_id: Uuid, active_only: bool) -> Result<Vec<AttributeOption>> {
        let state = self.state();
        let masters_all = state.masters.get(&self.kind).cloned().unwrap_or_default();

        let users: Vec<MappedUserAttribute> = state
            .users
            .get(&self.kind)
            .map(|rows| {
                rows.iter()
                    .filter(|a| a.user_id == user_id && (!active_only || a.is_active))
                    .map(|a| MappedUserAttribute {
                        id: a.id,
                        name: a.name.clone(),
                        mapped_to: a.mapped_master_id.and_then(|mid| {
                            masters_all.iter().find(|m| m.id == mid).map(|m| MappedTo {
                                id: m.id,
                                name: m.name.clone(),
                            })
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let masters: Vec<MasterAttribute> = masters_all
            .into_iter()
            .filter(|m| !active_only || m.is_active)
            .collect();

        Ok(merge_options(masters, users))
    }
}

#[async_trait]
impl TagLinkRepository for InMemoryWardrobe {
    async fn ensure_and_link(
        &self,
        kind: AttributeKind,
        item_id: Uuid,
        user_id: Uuid,
        names: &[String],
    ) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let cleaned = names
            .iter()
            .map(|n| clean_tag(n))
            .collect::<Result<Vec<_>>>()?;

        let mut state = self.state();
        state.take_failure(kind.field())?;
        for name in &cleaned {
            let attribute_id = state.upsert_tag(kind, user_id, name);
            state
                .links
                .entry(kind)
                .or_default()
                .insert((item_id, attribute_id));
        }
        Ok(())
    }

    async fn names_for_item(&self, kind: AttributeKind, item_id: Uuid) -> Result<Vec<String>> {
        let state = self.state();
        let Some(links) = state.links.get(&kind) else {
            return Ok(Vec::new());
        };
        let mut names: Vec<String> = links
            .iter()
            .filter(|(item, _)| *item == item_id)
            .filter_map(|(_, attr)| state.find_user_row(kind, *attr).map(|a| a.name.clone()))
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }
}

#[async_trait]
impl SeasonLinkRepository for InMemoryWardrobe {
    async fn link(&self, item_id: Uuid, labels: &[String]) -> Result<()> {
        let mut state = self.state();
        state.take_failure(TagField::Seasons)?;
        for season in resolve_seasons(labels) {
            state.season_links.insert((item_id, season));
        }
        Ok(())
    }

    async fn replace(&self, item_id: Uuid, labels: &[String]) -> Result<()> {
        let mut state = self.state();
        state.take_failure(TagField::Seasons)?;
        state.season_links.retain(|(item, _)| *item != item_id);
        for season in resolve_seasons(labels) {
            state.season_links.insert((item_id, season));
        }
        Ok(())
    }

    async fn seasons_for_item(&self, item_id: Uuid) -> Result<Vec<Season>> {
        let state = self.state();
        let mut seasons: Vec<Season> = state
            .season_links
            .iter()
            .filter(|(item, _)| *item == item_id)
            .map(|(_, season)| *season)
            .collect();
        seasons.sort();
        Ok(seasons)
    }
}
