//! Gateway status-code handling.

use studia_core::defaults::GATEWAY_ERROR_BODY_CHARS;
use studia_core::Error;

/// Gateway failure categories the caller can act on differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Too many requests, try again later.
    RateLimited,
    /// Request body (usually the embedded file) too large.
    PayloadTooLarge,
    /// Invalid gateway credentials.
    AuthenticationError,
    /// Gateway or upstream model failure.
    ServerError,
    /// Anything else.
    Unknown,
}

impl GatewayErrorCode {
    /// Determine error code from HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            413 => Self::PayloadTooLarge,
            401 | 403 => Self::AuthenticationError,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if a later retry by the caller could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

/// Convert a non-2xx gateway response into a studia Error.
///
/// The body is cut to a diagnostic-sized prefix; it ends up in server logs,
/// never in responses to the caller.
pub fn to_studia_error(status: u16, body: &str) -> Error {
    let body = truncate_body(body);
    let code = GatewayErrorCode::from_status(status);
    tracing::warn!(
        subsystem = "inference",
        component = "gateway",
        status,
        code = ?code,
        retryable = code.is_retryable(),
        "LLM gateway request failed"
    );
    match code {
        GatewayErrorCode::RateLimited => Error::RateLimited(body),
        GatewayErrorCode::PayloadTooLarge => Error::GatewayPayloadTooLarge(body),
        _ => Error::Gateway { status, body },
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(GATEWAY_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_429() {
        assert_eq!(
            GatewayErrorCode::from_status(429),
            GatewayErrorCode::RateLimited
        );
    }

    #[test]
    fn test_error_code_from_413() {
        assert_eq!(
            GatewayErrorCode::from_status(413),
            GatewayErrorCode::PayloadTooLarge
        );
    }

    #[test]
    fn test_error_code_from_401() {
        assert_eq!(
            GatewayErrorCode::from_status(401),
            GatewayErrorCode::AuthenticationError
        );
    }

    #[test]
    fn test_error_code_from_502() {
        assert_eq!(
            GatewayErrorCode::from_status(502),
            GatewayErrorCode::ServerError
        );
    }

    #[test]
    fn test_error_code_from_unknown() {
        assert_eq!(GatewayErrorCode::from_status(418), GatewayErrorCode::Unknown);
    }

    #[test]
    fn test_retryable() {
        assert!(GatewayErrorCode::RateLimited.is_retryable());
        assert!(GatewayErrorCode::ServerError.is_retryable());
        assert!(!GatewayErrorCode::PayloadTooLarge.is_retryable());
        assert!(!GatewayErrorCode::AuthenticationError.is_retryable());
    }

    #[test]
    fn test_to_studia_error_rate_limit() {
        let err = to_studia_error(429, "Too many requests");
        assert!(matches!(err, Error::RateLimited(ref b) if b == "Too many requests"));
    }

    #[test]
    fn test_to_studia_error_payload_too_large() {
        let err = to_studia_error(413, "payload");
        assert!(matches!(err, Error::GatewayPayloadTooLarge(_)));
    }

    #[test]
    fn test_to_studia_error_generic_keeps_status() {
        let err = to_studia_error(500, "boom");
        assert!(matches!(err, Error::Gateway { status: 500, ref body } if body == "boom"));
    }

    #[test]
    fn test_body_is_truncated() {
        let long = "x".repeat(GATEWAY_ERROR_BODY_CHARS * 3);
        match to_studia_error(503, &long) {
            Error::Gateway { body, .. } => {
                assert_eq!(body.chars().count(), GATEWAY_ERROR_BODY_CHARS)
            }
            other => panic!("Expected Gateway error, got {:?}", other),
        }
    }
}
