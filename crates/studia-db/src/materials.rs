//! Material repository implementations.
//!
//! Reads go through [`PgMaterialRepository`], which always filters by owner.
//! The content write goes through [`PgMaterialContentWriter`], which is backed
//! by its own pool connected with the service role and filters by id only.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use studia_core::{Error, Material, MaterialContentWriter, MaterialRepository, Result};

/// PostgreSQL implementation of MaterialRepository.
#[derive(Clone)]
pub struct PgMaterialRepository {
    pool: PgPool,
}

impl PgMaterialRepository {
    /// Create a new PgMaterialRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialRepository for PgMaterialRepository {
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Material>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, file_name, file_type, storage_path, content, created_at, updated_at
            FROM materials
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| Material {
            id: r.get("id"),
            user_id: r.get("user_id"),
            file_name: r.get("file_name"),
            file_type: r.get("file_type"),
            storage_path: r.get("storage_path"),
            content: r.get("content"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }
}

/// Service-privileged content writer.
///
/// Never hand this to request-parsing code; the extraction pipeline calls it
/// once, after ownership has been verified through [`PgMaterialRepository`].
pub struct PgMaterialContentWriter {
    pool: PgPool,
}

impl PgMaterialContentWriter {
    /// Create a writer over a pool connected with service credentials.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MaterialContentWriter for PgMaterialContentWriter {
    async fn overwrite_content(&self, id: Uuid, content: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE materials
            SET content = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            // deleted between the ownership check and the write
            warn!(
                subsystem = "database",
                component = "materials",
                op = "overwrite_content",
                material_id = %id,
                "Material vanished before content write"
            );
            return Err(Error::NotFound(format!("Material {} not found", id)));
        }

        debug!(
            subsystem = "database",
            component = "materials",
            op = "overwrite_content",
            material_id = %id,
            content_len = content.len(),
            "Material content overwritten"
        );
        Ok(())
    }
}
