//! # studia-db
//!
//! PostgreSQL materials store and object storage backends for studia.
//!
//! This crate provides:
//! - Connection pool management
//! - Owner-scoped material reads
//! - A service-privileged content writer on its own pool
//! - Supabase Storage and filesystem download backends
//!
//! ## Example
//!
//! ```rust,ignore
//! use studia_db::{Database, MaterialRepository};
//!
//! let db = Database::connect("postgres://localhost/studia").await?;
//! let material = db.materials.find_owned(material_id, user_id).await?;
//! ```

pub mod materials;
pub mod pool;
pub mod storage;

// Re-export core types
pub use studia_core::*;

pub use materials::{PgMaterialContentWriter, PgMaterialRepository};
pub use pool::{create_pool, create_pool_with_config, PoolConfig, PoolRole};
pub use storage::{FilesystemBackend, SupabaseStorageBackend};

/// Caller-scoped database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Owner-scoped material reads.
    pub materials: PgMaterialRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            materials: PgMaterialRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}

/// Connect the service-privileged content writer to its own pool.
pub async fn connect_service_writer(url: &str) -> Result<PgMaterialContentWriter> {
    let pool = create_pool_with_config(url, PoolConfig::service()).await?;
    Ok(PgMaterialContentWriter::new(pool))
}

