//! # studia-inference
//!
//! Clients for the hosted services the extraction pipeline calls out to.
//!
//! - [`openai`]: OpenAI-compatible chat completions gateway
//! - [`vision`]: verbatim OCR of PDFs and images through the gateway
//! - [`auth`]: bearer token validation against Supabase Auth

pub mod auth;
pub mod openai;
pub mod vision;

pub use auth::SupabaseAuth;
pub use openai::{GatewayConfig, OpenAIBackend};
pub use vision::{build_ocr_request, data_uri, OcrBackend};

// Re-export core types
pub use studia_core::*;
