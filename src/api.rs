//! HTTP surface - upload endpoint, report listing and health check

use crate::ingestion::defaults::DefaultPolicy;
use crate::ingestion::{ingest, IngestError, ReportStore, StoredReport};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Multipart field carrying the uploaded report
pub const UPLOAD_FIELD: &str = "xmlFile";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub policy: Arc<DefaultPolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>, policy: DefaultPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    data: T,
}

/// Failure body: `{"success": false, "kind": .., "message": ..}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: Option<&'static str>,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: None,
            message: message.into(),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        let status = if err.is_input_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error!("Error processing file ({}): {}", err.kind(), err);
        Self {
            status,
            kind: Some(err.kind()),
            message: format!("Error processing file: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "success": false,
            "message": self.message,
        });
        if let Some(kind) = self.kind {
            body["kind"] = serde_json::json!(kind);
        }
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/upload", post(upload_report))
        .route("/api/reports", get(list_reports))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

async fn upload_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<StoredReport>>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            info!("Received upload {:?} ({} bytes)", file_name, bytes.len());
            upload = Some(bytes);
        }
    }

    let Some(bytes) = upload else {
        warn!("Upload request without a {} field", UPLOAD_FIELD);
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    let ingested = ingest(&bytes, state.store.as_ref(), &state.policy).await?;

    Ok(Json(ApiResponse {
        success: true,
        message: Some("File processed successfully".to_string()),
        data: ingested.stored,
    }))
}

async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StoredReport>>>, ApiError> {
    let reports = state.store.list().await.map_err(|e| {
        error!("Error fetching reports: {}", e);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error fetching reports: {}", e),
        )
    })?;

    Ok(Json(ApiResponse {
        success: true,
        message: None,
        data: reports,
    }))
}
