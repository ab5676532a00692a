//! Strategy → adapter lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use studia_core::{Error, ExtractionAdapter, ExtractionResult, ExtractionStrategy, Result};
use studia_inference::OcrBackend;

use crate::adapters::{AiOcrAdapter, DocxAdapter};

/// Adapters keyed by the strategy they implement. At most one per strategy.
#[derive(Default)]
pub struct ExtractionRegistry {
    adapters: HashMap<ExtractionStrategy, Arc<dyn ExtractionAdapter>>,
}

impl ExtractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// DOCX parsing plus AI-OCR over `ocr`; what the server and CLI run with.
    pub fn standard(ocr: Arc<dyn OcrBackend>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxAdapter::new()));
        registry.register(Arc::new(AiOcrAdapter::new(ocr)));
        registry
    }

    /// Later registrations win.
    pub fn register(&mut self, adapter: Arc<dyn ExtractionAdapter>) {
        let strategy = adapter.strategy();
        if self.adapters.insert(strategy, adapter).is_some() {
            debug!(strategy = strategy.as_str(), "Replaced extraction adapter");
        }
    }

    fn adapter_for(&self, strategy: ExtractionStrategy) -> Result<&Arc<dyn ExtractionAdapter>> {
        self.adapters.get(&strategy).ok_or_else(|| {
            Error::Internal(format!("no adapter registered for {}", strategy.as_str()))
        })
    }

    pub async fn extract(
        &self,
        strategy: ExtractionStrategy,
        data: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<ExtractionResult> {
        let adapter = self.adapter_for(strategy)?;
        let start = Instant::now();
        let result = adapter.extract(data, file_name, mime_type).await;
        debug!(
            subsystem = "extract",
            component = "registry",
            strategy = strategy.as_str(),
            adapter = adapter.name(),
            ok = result.is_ok(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Adapter finished"
        );
        result
    }

    /// Registered strategies in a stable order.
    pub fn available_strategies(&self) -> Vec<ExtractionStrategy> {
        let mut strategies: Vec<_> = self.adapters.keys().copied().collect();
        strategies.sort_by_key(|s| s.as_str());
        strategies
    }

    pub fn has_adapter(&self, strategy: ExtractionStrategy) -> bool {
        self.adapters.contains_key(&strategy)
    }

    /// Probe every adapter; an errored probe counts as unhealthy.
    pub async fn health_check_all(&self) -> HashMap<ExtractionStrategy, bool> {
        let mut report = HashMap::with_capacity(self.adapters.len());
        for (strategy, adapter) in &self.adapters {
            let healthy = match adapter.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    warn!(strategy = strategy.as_str(), error = %e, "Adapter health check failed");
                    false
                }
            };
            report.insert(*strategy, healthy);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{docx_from_paragraphs, OcrReply, ScriptedOcrBackend};

    fn scripted(reply: OcrReply) -> Arc<ScriptedOcrBackend> {
        Arc::new(ScriptedOcrBackend::new(reply))
    }

    #[test]
    fn test_empty_registry_has_nothing() {
        let registry = ExtractionRegistry::new();
        assert!(registry.available_strategies().is_empty());
        assert!(!registry.has_adapter(ExtractionStrategy::DocxStructural));
    }

    #[test]
    fn test_register_single_adapter() {
        let mut registry = ExtractionRegistry::new();
        registry.register(Arc::new(DocxAdapter::new()));
        assert!(registry.has_adapter(ExtractionStrategy::DocxStructural));
        assert!(!registry.has_adapter(ExtractionStrategy::AiOcr));

        registry.register(Arc::new(DocxAdapter::new()));
        assert_eq!(registry.available_strategies().len(), 1);
    }

    #[test]
    fn test_standard_strategies_sorted() {
        let registry = ExtractionRegistry::standard(scripted(OcrReply::Text("text".into())));
        let names: Vec<_> = registry
            .available_strategies()
            .iter()
            .map(|s| s.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names.len(), 2);
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_missing_adapter_is_internal_error() {
        let registry = ExtractionRegistry::new();
        let err = registry
            .extract(ExtractionStrategy::AiOcr, b"data", "scan.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_routes_by_strategy() {
        let ocr = scripted(OcrReply::Text("hello world".into()));
        let registry = ExtractionRegistry::standard(ocr.clone());

        let ocr_result = registry
            .extract(ExtractionStrategy::AiOcr, b"img", "scan.png", "image/png")
            .await
            .unwrap();
        assert_eq!(ocr_result.extracted_text, "hello world");

        let docx = docx_from_paragraphs(&["Mitosis"]).unwrap();
        let docx_result = registry
            .extract(ExtractionStrategy::DocxStructural, &docx, "notes.docx", "")
            .await
            .unwrap();
        assert_eq!(docx_result.extracted_text, "Mitosis");
        assert_eq!(ocr.calls(), 1);
    }

    #[tokio::test]
    async fn test_health_check_all_reports_each_strategy() {
        let registry = ExtractionRegistry::standard(scripted(OcrReply::Text("ok".into())));
        let report = registry.health_check_all().await;
        assert_eq!(report.len(), 2);
        assert!(report.values().all(|healthy| *healthy));
    }
}
