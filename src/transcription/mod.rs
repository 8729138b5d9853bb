pub mod whisper;

pub use whisper::WhisperEngine;

use crate::error::Result;

/// Speech-to-text engine shared read-only across all transcription workers.
///
/// Implementations must tolerate concurrent calls; if the underlying model
/// is not reentrant they serialize inference internally.
pub trait Transcriber: Send + Sync {
    /// Transcribe one mono f32 waveform segment to text.
    fn transcribe(&self, samples: &[f32]) -> Result<String>;

    /// Name of the loaded model.
    fn model_name(&self) -> &str;

    /// Whether the engine is loaded and able to serve inference.
    fn is_ready(&self) -> bool;
}
