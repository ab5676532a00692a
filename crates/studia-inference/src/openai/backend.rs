//! OpenAI-compatible gateway client.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use studia_core::defaults;
use studia_core::{Error, Result};

use super::error::to_studia_error;
use super::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Configuration for the LLM gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL for the API endpoint (without `/chat/completions`).
    pub base_url: String,
    /// API key for authentication (optional for local gateways).
    pub api_key: Option<String>,
    /// Vision-capable model used for OCR.
    pub ocr_model: String,
    /// Sampling temperature for OCR requests.
    pub temperature: f32,
    /// Output token ceiling for OCR requests.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// HTTP-Referer header for OpenRouter.ai rankings (optional).
    pub http_referer: Option<String>,
    /// X-Title header for app name on OpenRouter.ai (optional).
    pub x_title: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GATEWAY_URL.to_string(),
            api_key: None,
            ocr_model: defaults::OCR_MODEL.to_string(),
            temperature: defaults::OCR_TEMPERATURE,
            max_tokens: defaults::OCR_MAX_TOKENS,
            timeout_seconds: defaults::GATEWAY_TIMEOUT_SECS,
            http_referer: None,
            x_title: None,
        }
    }
}

impl GatewayConfig {
    /// Load from `LLM_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            base_url: std::env::var("LLM_GATEWAY_URL").unwrap_or(base.base_url),
            api_key: std::env::var("LLM_GATEWAY_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            ocr_model: std::env::var("LLM_OCR_MODEL").unwrap_or(base.ocr_model),
            temperature: std::env::var("LLM_OCR_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.temperature),
            max_tokens: std::env::var("LLM_OCR_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.max_tokens),
            timeout_seconds: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.timeout_seconds),
            http_referer: std::env::var("LLM_HTTP_REFERER").ok(),
            x_title: std::env::var("LLM_X_TITLE").ok(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_ocr_model(mut self, model: impl Into<String>) -> Self {
        self.ocr_model = model.into();
        self
    }
}

/// Client for an OpenAI-compatible chat completions gateway.
pub struct OpenAIBackend {
    client: Client,
    config: GatewayConfig,
}

impl OpenAIBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            base_url = %config.base_url,
            ocr_model = %config.ocr_model,
            timeout_secs = config.timeout_seconds,
            "Initializing LLM gateway backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }

        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }

    /// Build a GET request with authentication.
    fn build_get_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.get(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req
    }

    /// Send one non-streaming chat completion.
    ///
    /// Non-2xx responses are mapped by status: 429 to `RateLimited`, 413 to
    /// `GatewayPayloadTooLarge`, anything else to `Gateway`.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(
            subsystem = "inference",
            op = "chat_completion",
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        let response = self
            .build_request("/chat/completions")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                subsystem = "inference",
                op = "chat_completion",
                status = status.as_u16(),
                "Gateway returned error status"
            );
            return Err(to_studia_error(status.as_u16(), &body));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse gateway response: {}", e)))
    }

    /// Check gateway reachability with a model list request.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .build_get_request("/models")
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("LLM gateway health check passed");
                    Ok(true)
                } else {
                    warn!("LLM gateway health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("LLM gateway health check error: {}", e);
                Ok(false)
            }
        }
    }
}
