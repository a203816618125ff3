//! Generic per-kind attribute catalog on PostgreSQL.
//!
//! Colors, materials and occasions have identically shaped tables; an
//! [`AttributeTable`] names them for one kind and [`PgAttributeCatalog`]
//! runs the same statements against whichever kind it was built for.
//! Identifiers come only from the static table descriptors, never from
//! caller input.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wardrobe_core::{
    clean_label, merge_options, normalize_label, AccessDecision, AttributeKind, AttributeOption,
    AttributeRepository, Error, MappedTo, MappedUserAttribute, MasterAttribute, Result,
    UserAttribute,
};

/// Table and column names backing one attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeTable {
    pub kind: AttributeKind,
    /// Per-user entries.
    pub user_table: &'static str,
    /// Shared reference entries.
    pub master_table: &'static str,
    /// Item link table.
    pub link_table: &'static str,
    /// Column of `link_table` referencing `user_table`.
    pub link_column: &'static str,
    /// Column of `user_table` referencing `master_table`.
    pub mapped_column: &'static str,
}

impl AttributeTable {
    pub const fn for_kind(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Color => Self {
                kind,
                user_table: "colors",
                master_table: "colors_master",
                link_table: "item_colors",
                link_column: "color_id",
                mapped_column: "mapped_color_id",
            },
            AttributeKind::Material => Self {
                kind,
                user_table: "materials",
                master_table: "materials_master",
                link_table: "item_materials",
                link_column: "material_id",
                mapped_column: "mapped_material_id",
            },
            AttributeKind::Occasion => Self {
                kind,
                user_table: "occasions",
                master_table: "occasions_master",
                link_table: "item_occasions",
                link_column: "occasion_id",
                mapped_column: "mapped_occasion_id",
            },
        }
    }

    /// Scalar subquery resolving the master entry whose normalized name
    /// matches bind parameter `$param`.
    pub(crate) fn master_match_sql(&self, param: usize) -> String {
        format!(
            "(SELECT m.id FROM {master} m \
             WHERE wardrobe_label_key(m.name) = wardrobe_label_key(${param}) \
             ORDER BY m.id LIMIT 1)",
            master = self.master_table,
        )
    }

    fn user_columns(&self) -> String {
        format!(
            "id, user_id, name, is_active, {} AS mapped_master_id, created_at_utc",
            self.mapped_column
        )
    }
}

fn user_attribute_from_row(row: &PgRow) -> UserAttribute {
    UserAttribute {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        is_active: row.get("is_active"),
        mapped_master_id: row.get("mapped_master_id"),
        created_at_utc: row.get("created_at_utc"),
    }
}

/// PostgreSQL implementation of [`AttributeRepository`] for one kind.
#[derive(Clone)]
pub struct PgAttributeCatalog {
    pool: Pool<Postgres>,
    table: AttributeTable,
}

impl PgAttributeCatalog {
    pub fn new(pool: Pool<Postgres>, kind: AttributeKind) -> Self {
        Self {
            pool,
            table: AttributeTable::for_kind(kind),
        }
    }

    pub fn table(&self) -> &AttributeTable {
        &self.table
    }

    async fn fetch_masters(
        &self,
        conn: &mut sqlx::PgConnection,
        active_only: bool,
    ) -> Result<Vec<MasterAttribute>> {
        let filter = if active_only {
            "WHERE is_active = true"
        } else {
            ""
        };
        let rows = sqlx::query(&format!(
            "SELECT id, name, is_active FROM {} {}",
            self.table.master_table, filter
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| MasterAttribute {
                id: row.get("id"),
                name: row.get("name"),
                is_active: row.get("is_active"),
            })
            .collect())
    }

    async fn fetch_mapped_users(
        &self,
        conn: &mut sqlx::PgConnection,
        user_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<MappedUserAttribute>> {
        let filter = if active_only {
            "AND u.is_active = true"
        } else {
            ""
        };
        let rows = sqlx::query(&format!(
            r#"
            SELECT u.id, u.name, m.id AS mapped_id, m.name AS mapped_name
            FROM {user} u
            LEFT JOIN {master} m ON m.id = u.{mapped}
            WHERE u.user_id = $1 {filter}
            "#,
            user = self.table.user_table,
            master = self.table.master_table,
            mapped = self.table.mapped_column,
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let mapped_id: Option<Uuid> = row.get("mapped_id");
                let mapped_name: Option<String> = row.get("mapped_name");
                MappedUserAttribute {
                    id: row.get("id"),
                    name: row.get("name"),
                    mapped_to: mapped_id
                        .zip(mapped_name)
                        .map(|(id, name)| MappedTo { id, name }),
                }
            })
            .collect())
    }
}

#[async_trait]
impl AttributeRepository for PgAttributeCatalog {
    fn kind(&self) -> AttributeKind {
        self.table.kind
    }

    async fn list(&self, user_id: Uuid, active_only: bool) -> Result<Vec<UserAttribute>> {
        let start = Instant::now();
        let (filter, order) = if active_only {
            ("AND is_active = true", "lower(name) ASC, id")
        } else {
            ("", "is_active DESC, lower(name) ASC, id")
        };

        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let rows = sqlx::query(&format!(
            "SELECT {cols} FROM {user} WHERE user_id = $1 {filter} ORDER BY {order}",
            cols = self.table.user_columns(),
            user = self.table.user_table,
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Database)?;

        let entries: Vec<UserAttribute> = rows.iter().map(user_attribute_from_row).collect();

        debug!(
            subsystem = "catalog",
            component = "attributes",
            op = "list",
            kind = %self.table.kind,
            user_id = %user_id,
            active_only,
            result_count = entries.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed attributes"
        );
        Ok(entries)
    }

    async fn create(&self, user_id: Uuid, name: &str) -> Result<UserAttribute> {
        let start = Instant::now();
        let clean = clean_label(name)?;

        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        // On a name clash only the active flag changes; name and mapping stay.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO {user} (user_id, name, {mapped}, is_active)
            VALUES ($1, $2, {master_match}, true)
            ON CONFLICT (user_id, wardrobe_label_key(name))
            DO UPDATE SET is_active = true
            RETURNING {cols}
            "#,
            user = self.table.user_table,
            mapped = self.table.mapped_column,
            master_match = self.table.master_match_sql(2),
            cols = self.table.user_columns(),
        ))
        .bind(user_id)
        .bind(&clean)
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Database)?;

        let entry = user_attribute_from_row(&row);

        debug!(
            subsystem = "catalog",
            component = "attributes",
            op = "create",
            kind = %self.table.kind,
            user_id = %user_id,
            attribute_id = %entry.id,
            mapped = entry.mapped_master_id.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Created or reactivated attribute"
        );
        Ok(entry)
    }

    async fn rename(&self, attribute_id: Uuid, name: &str) -> Result<bool> {
        let clean = clean_label(name)?;

        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let result = sqlx::query(&format!(
            "UPDATE {user} SET name = $2, {mapped} = {master_match} WHERE id = $1",
            user = self.table.user_table,
            mapped = self.table.mapped_column,
            master_match = self.table.master_match_sql(2),
        ))
        .bind(attribute_id)
        .bind(&clean)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Error::Conflict(format!(
                "A {} named '{}' already exists",
                self.table.kind, clean
            )),
            other => Error::Database(other),
        })?;

        debug!(
            subsystem = "catalog",
            component = "attributes",
            op = "rename",
            kind = %self.table.kind,
            attribute_id = %attribute_id,
            found = result.rows_affected() > 0,
            "Renamed attribute"
        );
        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, attribute_id: Uuid, is_active: bool) -> Result<bool> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_active = $2 WHERE id = $1",
            self.table.user_table
        ))
        .bind(attribute_id)
        .bind(is_active)
        .execute(&mut *conn)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "catalog",
            component = "attributes",
            op = "set_active",
            kind = %self.table.kind,
            attribute_id = %attribute_id,
            is_active,
            found = result.rows_affected() > 0,
            "Updated attribute active flag"
        );
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, attribute_id: Uuid, requesting_user_id: Uuid) -> Result<bool> {
        let kind = self.table.kind;
        let in_use = || {
            Error::Conflict(format!(
                "This {} is used by items. Disable it instead.",
                kind
            ))
        };

        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;

        let owner: Option<Uuid> = sqlx::query_scalar(&format!(
            "SELECT user_id FROM {} WHERE id = $1",
            self.table.user_table
        ))
        .bind(attribute_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(Error::Database)?;

        let Some(owner) = owner else {
            return Ok(false);
        };

        AccessDecision::evaluate(owner, requesting_user_id).require(kind.as_str())?;

        let linked: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = $1)",
            self.table.link_table, self.table.link_column
        ))
        .bind(attribute_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Database)?;

        if linked {
            return Err(in_use());
        }

        // A link added after the check trips the foreign key instead.
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1",
            self.table.user_table
        ))
        .bind(attribute_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => in_use(),
            other => Error::Database(other),
        })?;

        info!(
            subsystem = "catalog",
            component = "attributes",
            op = "delete",
            kind = %kind,
            attribute_id = %attribute_id,
            user_id = %requesting_user_id,
            "Deleted attribute"
        );
        Ok(result.rows_affected() > 0)
    }

    async fn options(&self, user_id: Uuid, active_only: bool) -> Result<Vec<AttributeOption>> {
        let start = Instant::now();
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;

        let masters = self.fetch_masters(&mut conn, active_only).await?;
        let users = self
            .fetch_mapped_users(&mut conn, user_id, active_only)
            .await?;
        let options = merge_options(masters, users);

        debug!(
            subsystem = "catalog",
            component = "options",
            op = "options",
            kind = %self.table.kind,
            user_id = %user_id,
            active_only,
            result_count = options.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Merged attribute options"
        );
        Ok(options)
    }
}

/// Non-ASCII sample run through both the SQL key and [`normalize_label`].
pub const LABEL_KEY_SAMPLE: &str = "  Crêpe DE\tCHINE   Ö ";

/// Check that `wardrobe_label_key` agrees with [`normalize_label`] on this
/// database.
///
/// PostgreSQL's `lower()` and `\s` follow the database `LC_CTYPE`; under the
/// `C` ctype non-ASCII letters keep their case and uniqueness silently
/// diverges from the in-process key. Fails with [`Error::Config`] on
/// mismatch.
pub async fn verify_label_key(pool: &Pool<Postgres>) -> Result<()> {
    let key: String = sqlx::query_scalar("SELECT wardrobe_label_key($1)")
        .bind(LABEL_KEY_SAMPLE)
        .fetch_one(pool)
        .await
        .map_err(Error::Database)?;

    let expected = normalize_label(LABEL_KEY_SAMPLE);
    if key != expected {
        warn!(
            subsystem = "db",
            component = "attributes",
            op = "verify_label_key",
            sql_key = %key,
            expected = %expected,
            "wardrobe_label_key disagrees with normalize_label"
        );
        return Err(Error::Config(format!(
            "wardrobe_label_key returned {key:?}, expected {expected:?}; \
             the database needs a UTF-8 LC_CTYPE"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_follow_kind_naming() {
        let color = AttributeTable::for_kind(AttributeKind::Color);
        assert_eq!(color.user_table, "colors");
        assert_eq!(color.master_table, "colors_master");
        assert_eq!(color.link_table, "item_colors");
        assert_eq!(color.link_column, "color_id");
        assert_eq!(color.mapped_column, "mapped_color_id");

        let occasion = AttributeTable::for_kind(AttributeKind::Occasion);
        assert_eq!(occasion.link_column, "occasion_id");
        assert_eq!(occasion.mapped_column, "mapped_occasion_id");
    }

    #[test]
    fn test_every_kind_has_distinct_tables() {
        let tables: Vec<AttributeTable> = AttributeKind::ALL
            .into_iter()
            .map(AttributeTable::for_kind)
            .collect();
        for (i, a) in tables.iter().enumerate() {
            assert_eq!(a.kind, AttributeKind::ALL[i]);
            for b in &tables[i + 1..] {
                assert_ne!(a.user_table, b.user_table);
                assert_ne!(a.link_table, b.link_table);
            }
        }
    }

    #[test]
    fn test_master_match_uses_requested_parameter() {
        let sql = AttributeTable::for_kind(AttributeKind::Material).master_match_sql(3);
        assert!(sql.contains("FROM materials_master m"));
        assert!(sql.contains("wardrobe_label_key($3)"));
    }

    #[test]
    fn test_label_key_sample_exercises_non_ascii_case() {
        let key = normalize_label(LABEL_KEY_SAMPLE);
        assert_eq!(key, "crêpe de chine ö");
        let ascii_only = LABEL_KEY_SAMPLE
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        assert_ne!(key, ascii_only, "sample must need non-ASCII lowercasing");
    }
}
