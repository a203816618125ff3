//! Master vocabulary seeding.
//!
//! Inserts the shared reference entries for every kind plus the four
//! seasons. Re-running is harmless: existing names are left untouched.

use sqlx::{Pool, Postgres};
use tracing::info;

use wardrobe_core::{display_label, AttributeKind, Error, Result, Season};

use crate::attributes::AttributeTable;

pub const MASTER_COLORS: &[&str] = &[
    "black", "white", "grey", "blue", "red", "green", "beige", "brown", "pink", "purple",
    "yellow", "orange", "navy", "turquoise", "burgundy", "mustard", "other",
];

pub const MASTER_MATERIALS: &[&str] = &[
    "cotton", "denim", "wool", "leather", "polyester", "linen", "silk", "elastane", "nylon",
    "cashmere", "viscose", "knit", "suede", "alpaca", "other",
];

pub const MASTER_OCCASIONS: &[&str] = &[
    "casual", "work", "formal", "sport", "party", "travel", "outdoors", "home", "date", "school",
    "dinner", "other",
];

/// Master vocabulary for a kind.
pub fn master_vocabulary(kind: AttributeKind) -> &'static [&'static str] {
    match kind {
        AttributeKind::Color => MASTER_COLORS,
        AttributeKind::Material => MASTER_MATERIALS,
        AttributeKind::Occasion => MASTER_OCCASIONS,
    }
}

/// Rows inserted by one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    pub colors: u64,
    pub materials: u64,
    pub occasions: u64,
    pub seasons: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.colors + self.materials + self.occasions + self.seasons
    }
}

/// Insert every master entry and season that is not already present.
pub async fn seed_master_data(pool: &Pool<Postgres>) -> Result<SeedReport> {
    let mut tx = pool.begin().await.map_err(Error::Database)?;
    let mut report = SeedReport::default();

    for kind in AttributeKind::ALL {
        let table = AttributeTable::for_kind(kind);
        let names: Vec<String> = master_vocabulary(kind)
            .iter()
            .map(|name| display_label(name))
            .collect();

        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO {} (name)
            SELECT * FROM UNNEST($1::text[])
            ON CONFLICT (wardrobe_label_key(name)) DO NOTHING
            "#,
            table.master_table
        ))
        .bind(&names)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        match kind {
            AttributeKind::Color => report.colors = inserted,
            AttributeKind::Material => report.materials = inserted,
            AttributeKind::Occasion => report.occasions = inserted,
        }
    }

    let season_names: Vec<String> = Season::ALL.iter().map(|s| s.name().to_string()).collect();
    report.seasons = sqlx::query(
        "INSERT INTO seasons (name) SELECT * FROM UNNEST($1::text[]) ON CONFLICT (name) DO NOTHING",
    )
    .bind(&season_names)
    .execute(&mut *tx)
    .await
    .map_err(Error::Database)?
    .rows_affected();

    tx.commit().await.map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "seed",
        op = "seed",
        colors = report.colors,
        materials = report.materials,
        occasions = report.occasions,
        seasons = report.seasons,
        "Seeded master vocabulary"
    );
    Ok(report)
}
