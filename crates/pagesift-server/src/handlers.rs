//! HTTP request handlers.
//!
//! `POST /parse` renders, reduces and extracts one page; `GET /health`
//! reports liveness.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use pagesift_domain::LlmProvider;
use pagesift_extractor::{Extractor, ExtractorError};
use pagesift_llm::LlmError;
use pagesift_render::{BrowserLauncher, RenderError, RenderSession};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

/// Shared application state
pub struct AppState<B, L>
where
    B: BrowserLauncher,
    L: LlmProvider<Error = LlmError>,
{
    /// Render session shared by every request
    pub session: Arc<RenderSession<B>>,
    /// Reducer plus LLM client
    pub extractor: Arc<Extractor<L>>,
}

impl<B, L> AppState<B, L>
where
    B: BrowserLauncher,
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    /// Bundle a session and an extractor
    pub fn new(session: RenderSession<B>, extractor: Extractor<L>) -> Self {
        Self {
            session: Arc::new(session),
            extractor: Arc::new(extractor),
        }
    }
}

impl<B, L> Clone for AppState<B, L>
where
    B: BrowserLauncher,
    L: LlmProvider<Error = LlmError>,
{
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Parse request body
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    /// Page to extract from
    pub url: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed body or unusable URL
    BadRequest(String),
    /// Browser-stage failure
    Render(RenderError),
    /// Reduction, LLM or parsing failure
    Extract(ExtractorError),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Render(RenderError::Navigation { .. } | RenderError::EmptyPage { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Render(RenderError::NavigationTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extract(ExtractorError::LlmTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Extract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Render(e) => e.to_string(),
            AppError::Extract(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.message(),
        });
        (status, body).into_response()
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::Extract(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

/// Accept only absolute http(s) URLs
fn validate_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(AppError::BadRequest(format!(
            "Unsupported URL scheme '{}': only http and https are allowed",
            scheme
        ))),
    }
}

/// POST /parse - Render a page and extract JSON from it
async fn parse_page<B, L>(
    State(state): State<AppState<B, L>>,
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError>
where
    B: BrowserLauncher,
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    let Json(request) = body?;
    let url = validate_url(&request.url)?;
    let started = Instant::now();
    info!(url = %url, "parse request");

    let page = state.session.load(url.as_str()).await.map_err(|e| {
        warn!(url = %url, error = %e, "render failed");
        AppError::from(e)
    })?;

    let value = state
        .extractor
        .extract(&page, url.as_str())
        .await
        .map_err(|e| {
            warn!(url = %url, error = %e, "extraction failed");
            AppError::from(e)
        })?;

    info!(
        url = %url,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "parse request complete"
    );
    Ok(Json(value))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<B, L>(state: AppState<B, L>) -> Router
where
    B: BrowserLauncher,
    L: LlmProvider<Error = LlmError> + Send + Sync + 'static,
{
    Router::new()
        .route("/parse", post(parse_page::<B, L>))
        .route("/health", get(health_check))
        .with_state(state)
}
