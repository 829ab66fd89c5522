//! The `Transport` seam between the fetch pipeline and the network.
//!
//! The orchestrators only ever issue `GET` requests with query parameters, so the trait
//! is kept to exactly that. [`crate::RetryingSession`] is the production implementation;
//! tests substitute a scripted in-memory transport.

use crate::http::error::TransportError;
use serde_json::Value;
use std::time::Duration;

/// A blocking HTTP transport capable of issuing `GET` requests.
///
/// Implementations must not treat 4xx/5xx responses as errors: the status is handed
/// back in the [`TransportResponse`] and callers decide via
/// [`TransportResponse::error_for_status`]. Only failures that produce no response at
/// all (connection refused, timeout, ...) are reported as `Err`.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    url: String,
    status: u16,
    body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Turns a client (4xx) or server (5xx) status into [`TransportError::HttpStatus`].
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if (400..600).contains(&self.status) {
            return Err(TransportError::HttpStatus {
                url: self.url,
                status: self.status,
            });
        }
        Ok(self)
    }

    /// Decodes the body as JSON.
    pub fn json(&self) -> Result<Value, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::JsonDecode {
            url: self.url.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_for_status_passes_success_through() {
        let response = TransportResponse::new("https://example.test", 200, "{}");
        let response = response.error_for_status().unwrap();
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn test_error_for_status_rejects_client_and_server_errors() {
        for status in [400, 404, 429, 500, 503] {
            let err = TransportResponse::new("https://example.test/x", status, Vec::new())
                .error_for_status()
                .unwrap_err();
            match err {
                TransportError::HttpStatus { url, status: s } => {
                    assert_eq!(url, "https://example.test/x");
                    assert_eq!(s, status);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_json_decodes_body() {
        let response = TransportResponse::new("u", 200, r#"{"daily": {"time": []}}"#);
        assert_eq!(response.json().unwrap(), json!({"daily": {"time": []}}));
    }

    #[test]
    fn test_json_reports_decode_failure() {
        let response = TransportResponse::new("u", 200, "<html>");
        assert!(matches!(
            response.json(),
            Err(TransportError::JsonDecode { .. })
        ));
    }
}
