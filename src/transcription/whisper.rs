//! Whisper implementation of the Transcriber trait using whisper-rs.

use std::sync::Mutex;
use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::config::TranscriptionConfig;
use crate::error::{Result, TranscriberError};
use crate::transcription::Transcriber;

/// Whisper speech-to-text engine.
///
/// The model is loaded once at process start and shared across all workers.
/// WhisperContext is not reentrant, so inference calls are serialized through
/// the mutex; audio decoding and chunking stay parallel outside it.
pub struct WhisperEngine {
    context: Mutex<WhisperContext>,
    model_name: String,
    language: String,
    threads: Option<usize>,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("model_name", &self.model_name)
            .field("language", &self.language)
            .field("threads", &self.threads)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

impl WhisperEngine {
    /// Load the Whisper model from the configured path.
    pub fn load(config: &TranscriptionConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(TranscriberError::Transcription(format!(
                "model file not found: {}",
                config.model_path.display()
            )));
        }

        let model_name = config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!("🎤 Loading Whisper model: {}", config.model_path.display());

        let model_path = config.model_path.to_str().ok_or_else(|| {
            TranscriberError::Transcription("invalid UTF-8 in model path".to_string())
        })?;
        let context =
            WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                .map_err(|e| {
                    TranscriberError::Transcription(format!("failed to load model: {}", e))
                })?;

        info!("✅ Whisper model loaded: {}", model_name);

        Ok(Self {
            context: Mutex::new(context),
            model_name,
            language: config.language.clone(),
            threads: config.threads,
        })
    }
}

impl Transcriber for WhisperEngine {
    fn transcribe(&self, samples: &[f32]) -> Result<String> {
        let context = self.context.lock().map_err(|e| {
            TranscriberError::Transcription(format!("failed to acquire context lock: {}", e))
        })?;

        let mut state = context.create_state().map_err(|e| {
            TranscriberError::Transcription(format!("failed to create state: {}", e))
        })?;

        // Deterministic greedy sampling with an explicit language hint.
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        if let Some(threads) = self.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| TranscriberError::Transcription(format!("inference failed: {}", e)))?;

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_fails_for_missing_model() {
        let config = TranscriptionConfig {
            model_path: PathBuf::from("/nonexistent/model.bin"),
            language: "en".to_string(),
            threads: None,
        };

        let result = WhisperEngine::load(&config);
        assert!(result.is_err());
        match result {
            Err(TranscriberError::Transcription(message)) => {
                assert!(message.contains("model file not found"));
            }
            _ => panic!("expected transcription error"),
        }
    }

    #[test]
    fn test_load_fails_for_invalid_model_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let model_path = dir.path().join("ggml-fake.bin");
        std::fs::write(&model_path, b"not a real model").unwrap();

        let config = TranscriptionConfig {
            model_path,
            language: "en".to_string(),
            threads: Some(2),
        };

        assert!(WhisperEngine::load(&config).is_err());
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WhisperEngine>();
    }
}
