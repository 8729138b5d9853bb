//! API data models

use serde::{Deserialize, Serialize};

/// Response to a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
    pub message: String,
}

impl UploadResponse {
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            message: "Transcription started. Use /status endpoint to check progress.".to_string(),
        }
    }
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn healthy(model_loaded: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded,
        }
    }
}

/// Error payload returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_shape() {
        let response = UploadResponse::new("abc".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["task_id"], "abc");
        assert_eq!(
            json["message"],
            "Transcription started. Use /status endpoint to check progress."
        );
    }

    #[test]
    fn test_health_response_shape() {
        let json = serde_json::to_value(HealthResponse::healthy(true)).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
    }
}
