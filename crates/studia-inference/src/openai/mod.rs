//! OpenAI-compatible LLM gateway support.
//!
//! Works with any endpoint implementing `/chat/completions`, such as
//! OpenRouter, LiteLLM or a self-hosted vLLM server.

mod backend;
mod error;
mod types;

pub use backend::{GatewayConfig, OpenAIBackend};
pub use error::{to_studia_error, GatewayErrorCode};
pub use types::*;
