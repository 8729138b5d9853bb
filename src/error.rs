use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriberError {
    /// Bad upload request (missing file field, empty filename).
    #[error("{0}")]
    InvalidInput(String),

    /// Invalid chunking parameters (zero sample rate or duration).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// Unknown task id or missing chunk record. Rendered bare: the message
    /// is the HTTP error body.
    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, TranscriberError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_renders_bare_message() {
        let err = TranscriberError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Task not found");
    }

    #[test]
    fn test_invalid_input_renders_bare_message() {
        let err = TranscriberError::InvalidInput("No file provided".to_string());
        assert_eq!(err.to_string(), "No file provided");
    }

    #[test]
    fn test_extraction_error_is_prefixed() {
        let err = TranscriberError::AudioExtraction("ffmpeg exited with 1".to_string());
        assert!(err.to_string().starts_with("Audio extraction failed:"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TranscriberError = io.into();
        assert!(matches!(err, TranscriberError::Io(_)));
    }
}
