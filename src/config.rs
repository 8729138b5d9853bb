use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the video transcription service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Audio extraction and chunking settings
    pub audio: AudioConfig,

    /// Transcription engine settings
    pub transcription: TranscriptionConfig,

    /// Upload and chunk-record storage settings
    pub storage: StorageConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate for transcription
    pub target_sample_rate: u32,

    /// Chunk duration in seconds
    pub chunk_duration_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Path to the Whisper model file
    pub model_path: PathBuf,

    /// Language hint for transcription
    pub language: String,

    /// Number of inference threads (None = auto-detect)
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for uploaded videos and extracted audio
    pub upload_dir: PathBuf,

    /// Directory for persisted chunk records
    pub chunks_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of concurrently running transcription workers
    pub max_workers: usize,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "video-transcriber.toml",
            "config/video-transcriber.toml",
            "/etc/video-transcriber/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.apply_env());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(mut self) -> Self {
        if let Ok(port) = std::env::var("VIDEO_TRANSCRIBER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(workers) = std::env::var("VIDEO_TRANSCRIBER_WORKERS") {
            if let Ok(workers) = workers.parse() {
                self.performance.max_workers = workers;
            }
        }

        if let Ok(model) = std::env::var("VIDEO_TRANSCRIBER_MODEL") {
            self.transcription.model_path = PathBuf::from(model);
        }

        if let Ok(upload_dir) = std::env::var("VIDEO_TRANSCRIBER_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(upload_dir);
        }

        if let Ok(chunks_dir) = std::env::var("VIDEO_TRANSCRIBER_CHUNKS_DIR") {
            self.storage.chunks_dir = PathBuf::from(chunks_dir);
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if self.audio.target_sample_rate == 0 {
            return Err(anyhow!("target_sample_rate must be greater than 0"));
        }

        if self.audio.chunk_duration_secs == 0 {
            return Err(anyhow!("chunk_duration_secs must be greater than 0"));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than 0"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Transcriber Configuration:\n\
            - Bind: {}:{}\n\
            - Workers: {}\n\
            - Audio Sample Rate: {}Hz\n\
            - Chunk Duration: {}s\n\
            - Model: {}\n\
            - Upload Directory: {}\n\
            - Chunks Directory: {}",
            self.server.host,
            self.server.port,
            self.performance.max_workers,
            self.audio.target_sample_rate,
            self.audio.chunk_duration_secs,
            self.transcription.model_path.display(),
            self.storage.upload_dir.display(),
            self.storage.chunks_dir.display()
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_upload_bytes: 512 * 1024 * 1024,
            },
            audio: AudioConfig {
                target_sample_rate: 16000, // Optimal for Whisper
                chunk_duration_secs: 30,
            },
            transcription: TranscriptionConfig {
                model_path: PathBuf::from("models/ggml-base.bin"),
                language: "en".to_string(),
                threads: None,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                chunks_dir: PathBuf::from("chunks"),
            },
            performance: PerformanceConfig {
                max_workers: num_cpus::get().min(8),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.audio.target_sample_rate = sample_rate;
        self
    }

    pub fn with_chunk_duration(mut self, secs: u32) -> Self {
        self.config.audio.chunk_duration_secs = secs;
        self
    }

    pub fn with_model_path(mut self, path: PathBuf) -> Self {
        self.config.transcription.model_path = path;
        self
    }

    pub fn with_upload_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.upload_dir = dir;
        self
    }

    pub fn with_chunks_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.chunks_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
