//! # wardrobe-db
//!
//! PostgreSQL database layer for the wardrobe attribute taxonomy.
//!
//! This crate provides:
//! - Connection pool management and environment configuration
//! - One generic attribute catalog serving colors, materials and occasions
//! - Tag upsert-or-link and season linking for clothing items
//! - Embedded migrations and master vocabulary seeding
//!
//! ## Example
//!
//! ```rust,ignore
//! use wardrobe_db::{AttributeKind, AttributeRepository, Database, ItemTags};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/wardrobe").await?;
//!     let user_id = uuid::Uuid::new_v4();
//!
//!     let navy = db.catalog(AttributeKind::Color).create(user_id, "Navy").await?;
//!     println!("Created color {}", navy.id);
//!
//!     let tags = ItemTags {
//!         colors: vec!["Navy".into()],
//!         seasons: vec!["fall".into()],
//!         ..Default::default()
//!     };
//!     db.item_tags().on_create(item_id, user_id, &tags).await?;
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod config;
pub mod pool;
pub mod seasons;
pub mod seed;
pub mod tag_links;

// Note: always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use wardrobe_core::*;

pub use attributes::{verify_label_key, AttributeTable, PgAttributeCatalog, LABEL_KEY_SAMPLE};
pub use config::WardrobeConfig;
pub use pool::{log_pool_metrics, open_pool, PoolConfig};
pub use seasons::{load_season_catalog, PgSeasonRepository};
pub use seed::{seed_master_data, SeedReport};
pub use tag_links::PgTagLinkRepository;

use std::sync::Arc;

use sqlx::PgPool;

/// Database handle bundling every repository.
#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
    pub colors: PgAttributeCatalog,
    pub materials: PgAttributeCatalog,
    pub occasions: PgAttributeCatalog,
    pub tag_links: PgTagLinkRepository,
    pub seasons: PgSeasonRepository,
    retry: RetryPolicy,
}

impl Database {
    /// Build a handle from a pool and an already loaded season catalog.
    pub fn new(pool: PgPool, seasons: SeasonCatalog) -> Self {
        Self {
            colors: PgAttributeCatalog::new(pool.clone(), AttributeKind::Color),
            materials: PgAttributeCatalog::new(pool.clone(), AttributeKind::Material),
            occasions: PgAttributeCatalog::new(pool.clone(), AttributeKind::Occasion),
            tag_links: PgTagLinkRepository::new(pool.clone()),
            seasons: PgSeasonRepository::new(pool.clone(), seasons),
            retry: RetryPolicy::default(),
            pool,
        }
    }

    /// Build a handle from a pool whose schema is already migrated, loading
    /// the season catalog once.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let seasons = load_season_catalog(&pool).await?;
        Ok(Self::new(pool, seasons))
    }

    /// Connect with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = open_pool(database_url, &PoolConfig::default()).await?;
        Self::from_pool(pool).await
    }

    /// Connect using pool and retry settings from [`WardrobeConfig`].
    pub async fn connect_with_config(config: &WardrobeConfig) -> Result<Self> {
        let pool = open_pool(&config.database_url, &config.pool).await?;
        Ok(Self::from_pool(pool).await?.with_retry(config.retry.clone()))
    }

    /// Retry policy handed to [`Database::item_tags`].
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Catalog for one attribute kind.
    pub fn catalog(&self, kind: AttributeKind) -> &PgAttributeCatalog {
        match kind {
            AttributeKind::Color => &self.colors,
            AttributeKind::Material => &self.materials,
            AttributeKind::Occasion => &self.occasions,
        }
    }

    /// Orchestrator syncing item tags through this database.
    pub fn item_tags(&self) -> ItemTagOrchestrator {
        ItemTagOrchestrator::new(
            Arc::new(self.tag_links.clone()),
            Arc::new(self.seasons.clone()),
        )
        .with_retry(self.retry.clone())
    }

    /// Apply the embedded migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        run_migrations(&self.pool).await
    }
}

/// Apply the embedded migrations to a pool.
///
/// Separate from [`Database`] because the season catalog can only be loaded
/// once the schema exists.
#[cfg(feature = "migrations")]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let start = std::time::Instant::now();
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
    tracing::info!(
        subsystem = "db",
        component = "migrations",
        op = "migrate",
        duration_ms = start.elapsed().as_millis() as u64,
        "Migrations applied"
    );
    Ok(())
}
