//! In-memory collaborators for running the pipeline without Postgres,
//! object storage or an LLM gateway.
//!
//! Available under `cfg(test)` and the `mock` feature. Every fake counts its
//! calls so tests can assert that a rejected request never reached storage or
//! the gateway.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use studia_core::{
    Error, Identity, IdentityProvider, Material, MaterialContentWriter, MaterialRepository,
    ObjectStorage, Result,
};
use studia_inference::openai::to_studia_error;
use studia_inference::OcrBackend;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Build a fresh material row with no content.
pub fn material(owner: Uuid, file_name: &str, file_type: Option<&str>, storage_path: &str) -> Material {
    let now = Utc::now();
    Material {
        id: Uuid::new_v4(),
        user_id: owner,
        file_name: file_name.to_string(),
        file_type: file_type.map(str::to_string),
        storage_path: Some(storage_path.to_string()),
        content: None,
        created_at: now,
        updated_at: now,
    }
}

/// Package `document_xml` as `word/document.xml` in a minimal DOCX container.
pub fn build_docx(document_xml: &str) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    writer.start_file("[Content_Types].xml", options)?;
    writer.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)?;
    writer.start_file("word/document.xml", options)?;
    writer.write_all(document_xml.as_bytes())?;
    Ok(writer.finish()?.into_inner())
}

/// Wrap plain paragraphs in `document.xml` markup, one run each.
pub fn docx_from_paragraphs(paragraphs: &[&str]) -> zip::result::ZipResult<Vec<u8>> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    build_docx(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    ))
}

// =============================================================================
// MATERIALS
// =============================================================================

/// Material table acting as both the caller-scoped reader and the service
/// writer, so a test can read back what the pipeline persisted.
#[derive(Default)]
pub struct InMemoryMaterials {
    rows: Mutex<HashMap<Uuid, Material>>,
    lookups: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryMaterials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, material: Material) -> Uuid {
        let id = material.id;
        lock(&self.rows).insert(id, material);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Material> {
        lock(&self.rows).get(&id).cloned()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MaterialRepository for InMemoryMaterials {
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Material>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.rows)
            .get(&id)
            .filter(|m| m.user_id == owner)
            .cloned())
    }
}

#[async_trait]
impl MaterialContentWriter for InMemoryMaterials {
    async fn overwrite_content(&self, id: Uuid, content: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = lock(&self.rows);
        let material = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Material {} not found", id)))?;
        material.content = Some(content.to_string());
        material.updated_at = Utc::now();
        Ok(())
    }
}

// =============================================================================
// OBJECT STORAGE
// =============================================================================

/// Bucket/path keyed blob store.
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    downloads: AtomicUsize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, path: &str, data: Vec<u8>) {
        lock(&self.objects).insert((bucket.to_string(), path.to_string()), data);
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        lock(&self.objects)
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| Error::Storage(format!("Object {}/{} does not exist", bucket, path)))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// OCR
// =============================================================================

/// What a [`ScriptedOcrBackend`] answers with.
#[derive(Debug, Clone)]
pub enum OcrReply {
    Text(String),
    /// Fail as if the gateway had answered with this HTTP status.
    Status(u16),
}

/// OCR backend returning a fixed reply.
pub struct ScriptedOcrBackend {
    reply: OcrReply,
    calls: AtomicUsize,
    last_mime: Mutex<Option<String>>,
}

impl ScriptedOcrBackend {
    pub fn new(reply: OcrReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_mime: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_mime(&self) -> Option<String> {
        lock(&self.last_mime).clone()
    }
}

#[async_trait]
impl OcrBackend for ScriptedOcrBackend {
    async fn extract_text(&self, _data: &[u8], mime_type: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_mime) = Some(mime_type.to_string());
        match &self.reply {
            OcrReply::Text(text) => Ok(text.clone()),
            OcrReply::Status(status) => Err(to_studia_error(*status, "scripted failure")),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "scripted-ocr"
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Identity provider accepting a fixed set of tokens.
#[derive(Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, user_id: Uuid) -> Self {
        self.tokens.insert(
            token.to_string(),
            Identity {
                user_id,
                email: None,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Identity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Invalid or expired token".to_string()))
    }
}
