/// Video Transcriber
///
/// Chunked asynchronous video transcription service: uploads are decoded to
/// audio, split into fixed-duration chunks, transcribed through a shared
/// Whisper engine, and exposed to polling clients through a task registry.
pub mod api;
pub mod audio;
pub mod chunking;
pub mod config;
pub mod error;
pub mod registry;
pub mod store;
pub mod transcription;
pub mod worker;

// Re-export main types for easy access
pub use crate::api::{ApiServer, AppState};
pub use crate::audio::{load_waveform, AudioExtractor, Waveform};
pub use crate::chunking::{chunk_count, split_waveform};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, TranscriberError};
pub use crate::registry::{TaskRegistry, TaskStatus};
pub use crate::store::{ChunkRecord, ChunkStore};
pub use crate::transcription::{Transcriber, WhisperEngine};
pub use crate::worker::WorkerPool;
