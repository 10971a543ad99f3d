//! REST API server for the math mentor
//!
//! Exposes the pipeline, feedback recording and the audit log over HTTP.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::MathMentor;
use crate::error::PipelineError;
use crate::models::{Feedback, InputType, OriginalInput, Submission};

const DEFAULT_RECENT_RUNS: usize = 10;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SolveRequest {
    pub input_type: String,
    pub text: String,
    /// Extraction confidence; typed text is always 1.0
    pub confidence: Option<f64>,
    pub user_confirmed: bool,
    #[serde(default)]
    pub reuse_previous: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecentRunsQuery {
    pub limit: Option<usize>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiReply = (StatusCode, Json<ApiResponse>);

fn error_reply(error: PipelineError) -> ApiReply {
    let status = match &error {
        PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(status = %status, error = %error, "Request failed");
    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub mentor: Arc<MathMentor>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Solve Endpoint
/// =============================

fn submission_from_request(req: SolveRequest) -> Result<Submission, PipelineError> {
    let input_type: InputType = req.input_type.parse()?;
    let confidence = match input_type {
        InputType::Text => 1.0,
        _ => req.confidence.unwrap_or(1.0),
    };

    Ok(Submission {
        input_type,
        original_input: OriginalInput::Text(req.text.clone()),
        extracted_text: req.text,
        confidence,
        user_confirmed: req.user_confirmed,
        reuse_previous: req.reuse_previous,
    })
}

async fn solve(State(state): State<ApiState>, Json(req): Json<SolveRequest>) -> ApiReply {
    info!(input_type = %req.input_type, "Received solve request");

    let submission = match submission_from_request(req) {
        Ok(submission) => submission,
        Err(e) => return error_reply(e),
    };

    match state.mentor.run(submission).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))),
        Err(e) => error_reply(e),
    }
}

/// =============================
/// Feedback Endpoint
/// =============================

async fn feedback(State(state): State<ApiState>, Json(req): Json<Feedback>) -> ApiReply {
    match state.mentor.record_feedback(req).await {
        Ok(record) => (StatusCode::OK, Json(ApiResponse::success(record))),
        Err(e) => error_reply(e),
    }
}

/// =============================
/// Audit Endpoints
/// =============================

async fn get_run(State(state): State<ApiState>, Path(run_id): Path<Uuid>) -> ApiReply {
    match state.mentor.audit_log().get(run_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(ApiResponse::success(record))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Run {} not found", run_id))),
        ),
        Err(e) => error_reply(e),
    }
}

async fn recent_runs(
    State(state): State<ApiState>,
    Query(query): Query<RecentRunsQuery>,
) -> ApiReply {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_RUNS);
    match state.mentor.audit_log().recent(limit).await {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::success(records))),
        Err(e) => error_reply(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(mentor: Arc<MathMentor>) -> Router {
    let state = ApiState { mentor };

    Router::new()
        .route("/health", get(health))
        .route("/api/solve", post(solve))
        .route("/api/feedback", post(feedback))
        .route("/api/runs", get(recent_runs))
        .route("/api/runs/:run_id", get(get_run))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    mentor: Arc<MathMentor>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(mentor);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
