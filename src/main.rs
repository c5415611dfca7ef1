//! ID Extractor - identity-document field extraction server.

mod config;
mod free_text;
mod labels;
mod ocr;
mod patterns;
mod predictions;
mod schema;
mod structured;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use config::ServiceConfig;
use image::ImageFormat;
use ocr::{OcrInput, OcrOutput, OcrProvider, OcrProviderKind, ProviderError};
use predictions::PickedIdentity;
use schema::{ExtractionResult, ParsedDocument};
use serde_json::{json, Value};
use std::sync::Arc;
use structured::StructuredExtractor;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Multipart field carrying the uploaded document.
const UPLOAD_FIELD: &str = "imageData";

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    provider: Arc<dyn OcrProvider>,
    provider_kind: OcrProviderKind,
    structured: StructuredExtractor,
    min_score: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "id_extractor=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    let provider = config.build_provider()?;
    info!(
        "Provider: {} (timeout {:?}, min score {})",
        provider.name(),
        config.upstream_timeout,
        config.min_score
    );

    let state = AppState {
        provider: Arc::from(provider),
        provider_kind: config.provider.kind(),
        structured: StructuredExtractor::new(config.fallback_scan),
        min_score: config.min_score,
    };

    let app = build_router(state, config.max_upload_bytes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/verify-id", post(verify_id))
        .route("/api/extract/structured", post(extract_structured))
        .route("/api/extract/text", post(extract_text))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    UnsupportedMedia(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            Self::UnsupportedMedia(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({ "error": msg }))).into_response()
            }
            Self::Provider(e) => e.into_response(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Upload an ID document, send it to the configured provider and extract
/// name, ID number and document type.
async fn verify_id(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4().simple().to_string();

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let filename = field.file_name().unwrap_or("document").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                .to_vec();
            upload = Some((filename, data));
            break;
        }
    }

    let Some((filename, data)) = upload.filter(|(_, data)| !data.is_empty()) else {
        return Err(ApiError::BadRequest(format!(
            "No file uploaded. Use form field \"{}\".",
            UPLOAD_FIELD
        )));
    };

    let Some(mime_type) = sniff_mime(&data) else {
        return Err(ApiError::UnsupportedMedia(
            "Invalid file type. Only jpeg, png, bmp, tiff, webp and pdf are accepted".to_string(),
        ));
    };

    info!(
        %request_id,
        "Received file: {} ({} bytes, {}) for provider {}",
        filename,
        data.len(),
        mime_type,
        state.provider.name()
    );

    let input = OcrInput {
        filename,
        mime_type: mime_type.to_string(),
        data,
    };

    let output = state.provider.process(&input).await.map_err(|e| {
        error!(%request_id, "Provider call failed: {}", e);
        e
    })?;

    let body = match output {
        OcrOutput::Json(raw) => {
            let (result, picked) = interpret_json(&state, &raw);
            if result.is_empty() {
                warn!(%request_id, "No structured fields parsed; returning raw response");
            } else {
                info!(
                    %request_id,
                    "Parsed fields: name={}, id_number={}, id_type={}",
                    result.name.is_some(),
                    result.id_number.is_some(),
                    result.id_type.is_some()
                );
            }
            structured_body(result, picked, raw)
        }
        OcrOutput::Text(text) => {
            let parsed = free_text::parse_id_and_type(&text);
            info!(%request_id, "Detected document type: {}", parsed.document_type);
            text_body(parsed, patterns::normalize_lines(&text))
        }
    };

    Ok(Json(body))
}

/// Run the structured extractor on a JSON body without calling a provider.
async fn extract_structured(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> Json<ExtractionResult> {
    Json(state.structured.extract(&raw))
}

/// Run the free-text extractor on a plain-text body.
async fn extract_text(text: String) -> Json<ParsedDocument> {
    Json(free_text::parse_id_and_type(&text))
}

// ============================================================================
// Helper functions
// ============================================================================

/// Prediction-list responses go through the confidence picker first; the
/// shape-probing extractor fills whatever is left.
fn interpret_json(state: &AppState, raw: &Value) -> (ExtractionResult, Option<PickedIdentity>) {
    let structured = state.structured.extract(raw);
    if state.provider_kind != OcrProviderKind::Nanonets {
        return (structured, None);
    }
    let picked = predictions::pick_from_response(raw, state.min_score);
    let result = ExtractionResult::from(picked.clone()).or_fill(structured);
    (result, Some(picked))
}

fn structured_body(result: ExtractionResult, picked: Option<PickedIdentity>, raw: Value) -> Value {
    let mut body = if result.is_empty() {
        json!({
            "message": "No structured fields parsed. Returning raw API response for debugging.",
            "raw": raw,
        })
    } else {
        json!({
            "name": result.name,
            "id_number": result.id_number,
            "id_type": result.id_type,
            "raw": raw,
        })
    };
    if let Some(picked) = picked {
        body["picked"] = json!(picked);
    }
    body
}

fn text_body(parsed: ParsedDocument, lines: Vec<String>) -> Value {
    let success = parsed.document_type.is_known();
    let message = if success {
        "Document type detected successfully"
    } else {
        "Could not detect document type"
    };
    json!({
        "success": success,
        "fields": parsed,
        "lines": lines,
        "message": message,
    })
}

/// MIME type of an accepted upload, from its leading bytes.
fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    match image::guess_format(data).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
