//! API request handlers

use axum::body::Bytes;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, TranscriberError};
use crate::registry::TaskStatus;
use crate::store::ChunkRecord;

use super::models::{HealthResponse, UploadResponse};
use super::server::AppState;

/// Handle a video upload: store it, extract audio synchronously, register
/// the task, and dispatch a detached worker.
///
/// The task id is generated before extraction so every intermediate artifact
/// is scoped to it, but the task only comes into existence (registry entry,
/// id returned to the caller) once extraction has succeeded.
pub async fn upload_video(state: &AppState, filename: &str, data: Bytes) -> Result<UploadResponse> {
    if filename.is_empty() {
        return Err(TranscriberError::InvalidInput(
            "No file selected".to_string(),
        ));
    }

    let task_id = Uuid::new_v4().to_string();

    // Keep only the final path component of the client-supplied name.
    let safe_name = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.bin".to_string());

    let upload_dir = &state.config.storage.upload_dir;
    let video_path = upload_dir.join(format!("{}_{}", task_id, safe_name));
    tokio::fs::write(&video_path, &data).await?;
    info!("📹 Video saved to: {}", video_path.display());

    let audio_path = state.extractor.audio_output_path(upload_dir, &task_id);
    state
        .extractor
        .extract_for_transcription(&video_path, &audio_path)
        .await?;

    state.registry.publish(&task_id, TaskStatus::queued()).await;
    state.workers.dispatch(task_id.clone(), audio_path);

    Ok(UploadResponse::new(task_id))
}

/// Handle task status polls.
pub async fn task_status(state: &AppState, task_id: &str) -> Result<TaskStatus> {
    state
        .registry
        .get(task_id)
        .await
        .ok_or_else(|| TranscriberError::NotFound("Task not found".to_string()))
}

/// Handle chunk record reads.
pub async fn task_chunks(state: &AppState, task_id: &str) -> Result<ChunkRecord> {
    state.store.retrieve(task_id).await
}

/// Handle health check requests.
pub fn health_check(state: &AppState) -> HealthResponse {
    HealthResponse::healthy(state.engine.is_ready())
}
