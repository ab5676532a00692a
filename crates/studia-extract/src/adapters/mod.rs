//! Extraction adapters, one per strategy.

pub mod ai_ocr;
pub mod docx;

pub use ai_ocr::AiOcrAdapter;
pub use docx::DocxAdapter;
