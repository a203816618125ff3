//! Upsert-or-link of free-text tags onto items.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, trace};
use uuid::Uuid;

use wardrobe_core::{clean_tag, AttributeKind, Error, Result, TagLinkRepository};

use crate::attributes::AttributeTable;

/// PostgreSQL implementation of [`TagLinkRepository`].
#[derive(Clone)]
pub struct PgTagLinkRepository {
    pool: Pool<Postgres>,
}

impl PgTagLinkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagLinkRepository for PgTagLinkRepository {
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
        let start = Instant::now();
        let cleaned = names
            .iter()
            .map(|name| clean_tag(name))
            .collect::<Result<Vec<String>>>()?;

        let table = AttributeTable::for_kind(kind);
        // Unlike catalog create, a name clash rewrites the stored spelling and
        // leaves is_active alone.
        let upsert_sql = format!(
            r#"
            INSERT INTO {user} (user_id, name, {mapped})
            VALUES ($1, $2, {master_match})
            ON CONFLICT (user_id, wardrobe_label_key(name))
            DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
            user = table.user_table,
            mapped = table.mapped_column,
            master_match = table.master_match_sql(2),
        );
        let link_sql = format!(
            "INSERT INTO {} (item_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table.link_table, table.link_column
        );

        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        for name in &cleaned {
            let attribute_id: Uuid = sqlx::query_scalar(&upsert_sql)
                .bind(user_id)
                .bind(name)
                .fetch_one(&mut *conn)
                .await
                .map_err(Error::Database)?;

            sqlx::query(&link_sql)
                .bind(item_id)
                .bind(attribute_id)
                .execute(&mut *conn)
                .await
                .map_err(Error::Database)?;

            trace!(
                subsystem = "tagging",
                component = "tag_links",
                op = "link",
                kind = %kind,
                item_id = %item_id,
                attribute_id = %attribute_id,
                "Linked tag"
            );
        }

        debug!(
            subsystem = "tagging",
            component = "tag_links",
            op = "ensure_and_link",
            kind = %kind,
            item_id = %item_id,
            user_id = %user_id,
            tag_count = cleaned.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Ensured and linked tags"
        );
        Ok(())
    }

    async fn names_for_item(&self, kind: AttributeKind, item_id: Uuid) -> Result<Vec<String>> {
        let table = AttributeTable::for_kind(kind);
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;
        let rows = sqlx::query(&format!(
            r#"
            SELECT a.name
            FROM {link} l
            JOIN {user} a ON a.id = l.{column}
            WHERE l.item_id = $1
            ORDER BY lower(a.name), a.id
            "#,
            link = table.link_table,
            user = table.user_table,
            column = table.link_column,
        ))
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }
}
