//! HTTP server mode for REST API access to the configured handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::engine::QueryOutcome;
use crate::error::{Error, ErrorKind, Result};
use crate::frame::Frame;
use crate::handlers::HandlerSet;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Handlers built from the config file
    pub handlers: Arc<HandlerSet>,
}

impl ServerConfig {
    pub fn new(handlers: Arc<HandlerSet>) -> Self {
        Self { handlers }
    }
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

/// Request body for the query endpoint
#[derive(Debug, Deserialize)]
struct QueryRequest {
    sql: String,
}

/// Request body for the predict endpoint
#[derive(Debug, Deserialize)]
struct PredictRequest {
    /// Prediction handler name
    handler: String,
    /// Input records
    #[serde(default)]
    rows: Vec<Value>,
}

/// Request body for the SQL passthrough endpoint
#[derive(Debug, Deserialize)]
struct SqlRequest {
    /// Database handler name
    handler: String,
    sql: String,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router over the configured handlers
pub fn router(config: ServerConfig) -> Router {
    let state = AppState { config };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tables", get(list_tables))
        .route("/query", post(run_query))
        .route("/predict", post(predict))
        .route("/sql", post(run_sql))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tables(State(state): State<Arc<AppState>>) -> Response {
    let engine = state.config.handlers.engine();
    let tables: Vec<Value> = engine
        .tables()
        .into_iter()
        .filter_map(|name| {
            let table = engine.table(name).ok()?;
            Some(json!({ "name": name, "columns": table.get_columns(None) }))
        })
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(json!({
            "type": "TABLES",
            "tables": tables
        }))),
    )
        .into_response()
}

async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Response {
    match state.config.handlers.engine().execute(&request.sql).await {
        Ok(QueryOutcome::Rows(frame)) => rows_response(&frame),
        Ok(QueryOutcome::Affected { rows }) => (
            StatusCode::OK,
            Json(ApiResponse::success(json!({
                "type": "AFFECTED",
                "rows": rows
            }))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Response {
    let handler = match state.config.handlers.predictor(&request.handler) {
        Ok(handler) => handler,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    };

    let input = Frame::infer_from_records(&request.rows);
    match handler.predict(&input).await {
        Ok(frame) => rows_response(&frame),
        Err(e) => error_response(&e),
    }
}

async fn run_sql(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SqlRequest>,
) -> Response {
    let handler = match state.config.handlers.database(&request.handler) {
        Ok(handler) => handler,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    };

    let sql = request.sql;
    let result = tokio::task::spawn_blocking(move || handler.query(&sql))
        .await
        .map_err(|e| Error::config(format!("Query task failed: {e}")));

    match result {
        Ok(Ok(frame)) => rows_response(&frame),
        Ok(Err(e)) | Err(e) => error_response(&e),
    }
}

fn rows_response(frame: &Frame) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(json!({
            "type": "ROWS",
            "columns": frame.columns(),
            "rows": frame.to_records()
        }))),
    )
        .into_response()
}

fn error_response(error: &Error) -> Response {
    let status = match error {
        Error::TableNotFound { .. } => StatusCode::NOT_FOUND,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        e => match e.kind() {
            ErrorKind::External => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        },
    };
    tracing::warn!("Request failed: {error}");
    (status, Json(ApiResponse::<()>::error(error.to_string()))).into_response()
}
