//! Extraction limits, loaded from the environment.

use crate::defaults;

/// Limits and locations used by the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Downloads larger than this are rejected before parsing.
    pub max_file_bytes: usize,
    /// Persisted content is cut to this many characters.
    pub max_content_chars: usize,
    /// Text trimming to fewer characters counts as an empty result.
    pub min_content_chars: usize,
    /// Characters echoed back in the response preview.
    pub preview_chars: usize,
    /// Object storage bucket holding uploads.
    pub bucket: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: defaults::MAX_FILE_BYTES,
            max_content_chars: defaults::MAX_CONTENT_CHARS,
            min_content_chars: defaults::MIN_CONTENT_CHARS,
            preview_chars: defaults::PREVIEW_CHARS,
            bucket: defaults::STORAGE_BUCKET.to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Create from environment variables, falling back to the defaults.
    pub fn from_env() -> Self {
        Self {
            max_file_bytes: env_parse("EXTRACTION_MAX_FILE_BYTES", defaults::MAX_FILE_BYTES),
            max_content_chars: env_parse(
                "EXTRACTION_MAX_CONTENT_CHARS",
                defaults::MAX_CONTENT_CHARS,
            ),
            min_content_chars: env_parse(
                "EXTRACTION_MIN_CONTENT_CHARS",
                defaults::MIN_CONTENT_CHARS,
            ),
            preview_chars: defaults::PREVIEW_CHARS,
            bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| defaults::STORAGE_BUCKET.to_string()),
        }
    }

    pub fn with_max_file_bytes(mut self, bytes: usize) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn with_max_content_chars(mut self, chars: usize) -> Self {
        self.max_content_chars = chars;
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_content_chars, 100_000);
        assert_eq!(config.min_content_chars, 5);
        assert_eq!(config.preview_chars, 300);
        assert_eq!(config.bucket, "study-materials");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ExtractionConfig::default()
            .with_max_file_bytes(42)
            .with_max_content_chars(7)
            .with_bucket("other");
        assert_eq!(config.max_file_bytes, 42);
        assert_eq!(config.max_content_chars, 7);
        assert_eq!(config.bucket, "other");
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        std::env::set_var("STUDIA_TEST_ENV_PARSE", "not-a-number");
        assert_eq!(env_parse("STUDIA_TEST_ENV_PARSE", 9usize), 9);
        std::env::remove_var("STUDIA_TEST_ENV_PARSE");
    }
}
