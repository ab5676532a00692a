//! # studia-core
//!
//! Core types, traits, and abstractions for the studia document extraction
//! service.
//!
//! This crate provides the Material model, the error taxonomy, file type
//! dispatch, text post-processing, and the collaborator traits the other
//! studia crates implement.

pub mod config;
pub mod defaults;
pub mod error;
pub mod file_kind;
pub mod logging;
pub mod models;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use file_kind::{effective_mime, mime_from_extension, FileKind};
pub use models::*;
pub use traits::*;
