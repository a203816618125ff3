//! Season links against the fixed `seasons` table.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wardrobe_core::{
    resolve_seasons, Error, Result, Season, SeasonCatalog, SeasonLinkRepository,
};

/// PostgreSQL implementation of [`SeasonLinkRepository`].
///
/// Season ids are read once by [`PgSeasonRepository::load`] and never
/// refreshed.
#[derive(Clone)]
pub struct PgSeasonRepository {
    pool: Pool<Postgres>,
    catalog: Arc<SeasonCatalog>,
}

impl PgSeasonRepository {
    pub fn new(pool: Pool<Postgres>, catalog: SeasonCatalog) -> Self {
        Self {
            pool,
            catalog: Arc::new(catalog),
        }
    }

    /// Read the season ids from the store and build the repository.
    pub async fn load(pool: Pool<Postgres>) -> Result<Self> {
        let catalog = load_season_catalog(&pool).await?;
        Ok(Self::new(pool, catalog))
    }

    pub fn catalog(&self) -> &SeasonCatalog {
        &self.catalog
    }

    async fn link_on(
        &self,
        conn: &mut PgConnection,
        item_id: Uuid,
        labels: &[String],
    ) -> Result<usize> {
        let seasons = resolve_seasons(labels);
        if seasons.len() < labels.len() {
            debug!(
                subsystem = "tagging",
                component = "seasons",
                item_id = %item_id,
                skipped = labels.len() - seasons.len(),
                "Skipping unrecognized or repeated season labels"
            );
        }

        let mut linked = 0;
        for season in seasons {
            let Some(season_id) = self.catalog.id_of(season) else {
                warn!(
                    subsystem = "tagging",
                    component = "seasons",
                    item_id = %item_id,
                    season = %season,
                    "Season missing from store, not linked"
                );
                continue;
            };
            sqlx::query(
                "INSERT INTO item_seasons (item_id, season_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(item_id)
            .bind(season_id)
            .execute(&mut *conn)
            .await
            .map_err(Error::Database)?;
            linked += 1;
        }
        Ok(linked)
    }
}

/// Read `(name, id)` rows of the seasons table into a [`SeasonCatalog`].
pub async fn load_season_catalog(pool: &Pool<Postgres>) -> Result<SeasonCatalog> {
    let rows = sqlx::query("SELECT id, name FROM seasons")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)?;

    let catalog = SeasonCatalog::from_rows(rows.iter().map(|row| {
        let name: String = row.get("name");
        let id: i32 = row.get("id");
        (name, id)
    }));

    let missing = catalog.missing();
    if missing.is_empty() {
        info!(
            subsystem = "db",
            component = "seasons",
            op = "load",
            result_count = catalog.len(),
            "Loaded season catalog"
        );
    } else {
        warn!(
            subsystem = "db",
            component = "seasons",
            op = "load",
            missing = ?missing,
            "Season catalog incomplete; run wardrobe-admin seed"
        );
    }
    Ok(catalog)
}

#[async_trait]
impl SeasonLinkRepository for PgSeasonRepository {
    async fn link(&self, item_id: Uuid, labels: &[String]) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let linked = self.link_on(&mut conn, item_id, labels).await?;
        debug!(
            subsystem = "tagging",
            component = "seasons",
            op = "link",
            item_id = %item_id,
            tag_count = linked,
            "Linked seasons"
        );
        Ok(())
    }

    async fn replace(&self, item_id: Uuid, labels: &[String]) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        sqlx::query("DELETE FROM item_seasons WHERE item_id = $1")
            .bind(item_id)
            .execute(&mut *conn)
            .await
            .map_err(Error::Database)?;

        let linked = self.link_on(&mut conn, item_id, labels).await?;
        debug!(
            subsystem = "tagging",
            component = "seasons",
            op = "replace",
            item_id = %item_id,
            tag_count = linked,
            "Replaced seasons"
        );
        Ok(())
    }

    async fn seasons_for_item(&self, item_id: Uuid) -> Result<Vec<Season>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT season_id FROM item_seasons WHERE item_id = $1")
                .bind(item_id)
                .fetch_all(&mut *conn)
                .await
                .map_err(Error::Database)?;

        let mut seasons: Vec<Season> = ids
            .into_iter()
            .filter_map(|id| self.catalog.season_of(id))
            .collect();
        seasons.sort();
        Ok(seasons)
    }
}
