//! Modular ID-recognition provider abstraction.
//!
//! Defines the [`OcrProvider`] trait and unified types so the remote field
//! extractors (Azapi, FormX, Nanonets) and the local Tesseract engine can be
//! swapped via configuration.

pub mod azapi;
pub mod formx;
pub mod nanonets;
pub mod tesseract;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Uploaded document handed to a provider.
#[derive(Debug, Clone)]
pub struct OcrInput {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Provider output: parsed JSON from a field-extraction API, or plain OCR text.
#[derive(Debug, Clone)]
pub enum OcrOutput {
    Json(serde_json::Value),
    Text(String),
}

/// Failures talking to a provider. The extractors never see these.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} returned {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned an unreadable body: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    #[error("local OCR engine failed: {0}")]
    Engine(String),
}

impl ProviderError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport { .. } | Self::Decode { .. } => StatusCode::BAD_GATEWAY,
            Self::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn provider(&self) -> &'static str {
        match self {
            Self::Upstream { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Decode { provider, .. } => provider,
            Self::Engine(_) => "tesseract",
        }
    }
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "error": format!("Failed to process document with {}", self.provider()),
            "details": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Async trait implemented by each recognition backend.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn process(&self, input: &OcrInput) -> Result<OcrOutput, ProviderError>;
}

/// Known provider identifiers used for configuration lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrProviderKind {
    Azapi,
    FormX,
    Nanonets,
    Tesseract,
}

impl OcrProviderKind {
    /// Parse a configuration string into a provider kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azapi" => Some(Self::Azapi),
            "formx" => Some(Self::FormX),
            "nanonets" => Some(Self::Nanonets),
            "tesseract" => Some(Self::Tesseract),
            _ => None,
        }
    }
}

/// Turn a non-success response into [`ProviderError::Upstream`], or decode
/// the JSON body.
pub(crate) async fn read_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Upstream {
            provider,
            status,
            body,
        });
    }

    let raw_text = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;
    tracing::debug!(
        "{}: raw response ({} bytes): {}",
        provider,
        raw_text.len(),
        raw_text.chars().take(500).collect::<String>()
    );

    serde_json::from_str(&raw_text).map_err(|e| ProviderError::Decode {
        provider,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_kind() {
        assert_eq!(OcrProviderKind::parse("azapi"), Some(OcrProviderKind::Azapi));
        assert_eq!(OcrProviderKind::parse(" FormX "), Some(OcrProviderKind::FormX));
        assert_eq!(OcrProviderKind::parse("nanonets"), Some(OcrProviderKind::Nanonets));
        assert_eq!(OcrProviderKind::parse("tesseract"), Some(OcrProviderKind::Tesseract));
        assert_eq!(OcrProviderKind::parse("docling"), None);
    }

    #[test]
    fn test_upstream_status_is_propagated() {
        let err = ProviderError::Upstream {
            provider: "azapi",
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad key".to_string(),
        };
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "azapi returned 401 Unauthorized: bad key");
    }

    #[test]
    fn test_engine_error_is_internal() {
        let err = ProviderError::Engine("missing binary".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.provider(), "tesseract");
    }
}
