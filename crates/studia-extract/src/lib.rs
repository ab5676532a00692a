//! # studia-extract
//!
//! Turns uploaded study materials into plain text.
//!
//! DOCX files are parsed structurally; PDFs and raster images go through a
//! vision model. [`ExtractionService`] strings the steps together and is the
//! only place the service-privileged content writer is used.

pub mod adapters;
pub mod extraction;
#[cfg(any(test, feature = "mock"))]
pub mod memory;
pub mod service;

pub use adapters::{AiOcrAdapter, DocxAdapter};
pub use extraction::ExtractionRegistry;
pub use service::{
    declared_mime, extract_and_process, strategy_for, ExtractionRequest, ExtractionService,
    ProcessedText,
};

// Re-export core types
pub use studia_core::*;
