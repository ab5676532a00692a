//! Collaborator traits for the extraction service.
//!
//! The pipeline only talks to the outside world through these seams, so the
//! same code runs against Postgres/Supabase in production and in-memory
//! fakes in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{ExtractionResult, ExtractionStrategy, Identity, Material, Result};

// =============================================================================
// RELATIONAL STORE
// =============================================================================

/// Caller-scoped read access to materials.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Fetch a material only if it belongs to `owner`.
    ///
    /// Returns `None` both when the id does not exist and when it belongs to
    /// somebody else; callers must not be able to tell the two apart.
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Material>>;
}

/// Service-privileged write access to material content.
///
/// Implementations hold credentials the caller does not have. Only the
/// persistence step of the extraction pipeline receives one.
#[async_trait]
pub trait MaterialContentWriter: Send + Sync {
    /// Replace the material's content wholesale.
    async fn overwrite_content(&self, id: Uuid, content: &str) -> Result<()>;
}

// =============================================================================
// OBJECT STORAGE
// =============================================================================

/// Read access to uploaded binaries.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Download the object at `path` in `bucket`.
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>>;

    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Resolves bearer tokens to user identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate `token`, returning `Error::Unauthorized` when it is not
    /// accepted.
    async fn authenticate(&self, token: &str) -> Result<Identity>;
}

// =============================================================================
// EXTRACTION ADAPTERS
// =============================================================================

/// Trait for file content extraction adapters.
///
/// Each adapter handles one extraction strategy. Adapters are registered in an
/// `ExtractionRegistry` and dispatched based on the file's detected kind.
#[async_trait]
pub trait ExtractionAdapter: Send + Sync {
    /// The extraction strategy this adapter handles.
    fn strategy(&self) -> ExtractionStrategy;

    /// Extract text from raw file data.
    async fn extract(
        &self,
        data: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<ExtractionResult>;

    /// Check if the adapter's external dependencies are available.
    async fn health_check(&self) -> Result<bool>;

    /// Human-readable name of this adapter.
    fn name(&self) -> &str;
}
