//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::audio::AudioExtractor;
use crate::config::Config;
use crate::error::TranscriberError;
use crate::registry::TaskRegistry;
use crate::store::ChunkStore;
use crate::transcription::Transcriber;
use crate::worker::WorkerPool;

use super::handlers;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: TaskRegistry,
    pub store: ChunkStore,
    pub extractor: AudioExtractor,
    pub workers: WorkerPool,
    pub engine: Arc<dyn Transcriber>,
    pub config: Arc<Config>,
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("🌐 API server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let max_upload = state.config.server.max_upload_bytes;

    Router::new()
        .route("/upload_video", post(upload_video_handler))
        .route("/status/:task_id", get(status_handler))
        .route("/chunks/:task_id", get(chunks_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload)),
        )
}

/// Map pipeline errors onto the HTTP surface
fn error_response(err: &TranscriberError) -> Response {
    let status = match err {
        TranscriberError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TranscriberError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}

/// Upload handler: reads the multipart `file` field and starts a task
async fn upload_video_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut file: Option<(String, axum::body::Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(&TranscriberError::InvalidInput(format!(
                    "Malformed upload: {}",
                    e
                )));
            }
        };

        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            match field.bytes().await {
                Ok(data) => {
                    file = Some((filename, data));
                    break;
                }
                Err(e) => {
                    return error_response(&TranscriberError::InvalidInput(format!(
                        "Malformed upload: {}",
                        e
                    )));
                }
            }
        }
    }

    let Some((filename, data)) = file else {
        return error_response(&TranscriberError::InvalidInput(
            "No file provided".to_string(),
        ));
    };

    match handlers::upload_video(&state, &filename, data).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Task status handler
async fn status_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Response {
    match handlers::task_status(&state, &task_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Chunk record handler
async fn chunks_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Response {
    match handlers::task_chunks(&state, &task_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(handlers::health_check(&state))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as TranscriberResult;
    use crate::registry::TaskStatus;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct SilentEngine;

    impl Transcriber for SilentEngine {
        fn transcribe(&self, _samples: &[f32]) -> TranscriberResult<String> {
            Ok(String::new())
        }

        fn model_name(&self) -> &str {
            "silent"
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    fn test_state(dir: &TempDir) -> AppState {
        let config = Arc::new(
            crate::config::ConfigBuilder::new()
                .with_upload_dir(dir.path().join("uploads"))
                .with_chunks_dir(dir.path().join("chunks"))
                .build(),
        );
        let registry = TaskRegistry::new();
        let store = ChunkStore::new(
            config.storage.chunks_dir.clone(),
            config.audio.chunk_duration_secs,
        );
        let engine: Arc<dyn Transcriber> = Arc::new(SilentEngine);
        let workers = WorkerPool::new(
            registry.clone(),
            store.clone(),
            Arc::clone(&engine),
            config.audio.chunk_duration_secs,
            2,
        );
        AppState {
            registry,
            store,
            extractor: AudioExtractor::new(config.audio.target_sample_rate),
            workers,
            engine,
            config,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_model_loaded() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
    }

    #[tokio::test]
    async fn test_status_unknown_task_is_404() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let response = app
            .oneshot(
                Request::get("/status/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Task not found");
    }

    #[tokio::test]
    async fn test_status_returns_registry_entry() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.registry.publish("t1", TaskStatus::queued()).await;
        let app = build_router(state);

        let response = app
            .oneshot(Request::get("/status/t1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "queued");
        assert_eq!(json["percent"], 0);
    }

    #[tokio::test]
    async fn test_chunks_missing_record_is_404() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.store.init().await.unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(Request::get("/chunks/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Chunks file not found");
    }

    #[tokio::test]
    async fn test_chunks_returns_persisted_record() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.store.init().await.unwrap();
        state
            .store
            .persist("t2", &["hello".to_string(), "world".to_string()])
            .await
            .unwrap();
        let app = build_router(state);

        let response = app
            .oneshot(Request::get("/chunks/t2").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["task_id"], "t2");
        assert_eq!(json["total_chunks"], 2);
        assert_eq!(json["chunks"][0]["timestamp"], "0-30s");
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_400() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir));

        let boundary = "test-boundary";
        let body = format!("--{}--\r\n", boundary);
        let response = app
            .oneshot(
                Request::post("/upload_video")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_failure_before_dispatch_issues_no_task() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let registry = state.registry.clone();
        // Upload directory never created: saving the video fails before any
        // task exists, so the error surfaces synchronously as a 500.
        let app = build_router(state);

        let boundary = "test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.mp4\"\r\n\r\nvideo bytes\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                Request::post("/upload_video")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_upload_with_empty_filename_is_400() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        tokio::fs::create_dir_all(&state.config.storage.upload_dir)
            .await
            .unwrap();
        let app = build_router(state);

        let boundary = "test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"\"\r\n\r\n\r\n--{b}--\r\n",
            b = boundary
        );
        let response = app
            .oneshot(
                Request::post("/upload_video")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No file selected");
    }
}
