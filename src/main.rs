use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use video_transcriber::api::{ApiServer, AppState};
use video_transcriber::audio::AudioExtractor;
use video_transcriber::config::Config;
use video_transcriber::registry::TaskRegistry;
use video_transcriber::store::ChunkStore;
use video_transcriber::transcription::{Transcriber, WhisperEngine};
use video_transcriber::worker::WorkerPool;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("video_transcriber=info,tower_http=info,warn")
        .init();

    let matches = Command::new("Video Transcriber")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Chunked asynchronous video transcription service")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("ADDR")
                .help("Bind address"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Listen port"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Path to the Whisper model file"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Maximum concurrent transcription workers"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default().apply_env()
    });

    // Command-line overrides
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.transcription.model_path = PathBuf::from(model);
    }
    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.max_workers = workers.parse()?;
    }
    if matches.get_flag("verbose") {
        info!("Verbose logging enabled");
    }

    config.validate()?;

    info!("🚀 Video Transcriber starting...");
    info!("{}", config.summary());

    // Ensure the uploads and chunks folders exist
    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;
    tokio::fs::create_dir_all(&config.storage.chunks_dir).await?;

    // Load the Whisper model once at startup, shared across all workers
    info!("Loading Whisper model at startup...");
    let engine: Arc<dyn Transcriber> = Arc::new(WhisperEngine::load(&config.transcription)?);
    info!("Whisper model loaded: {}", engine.model_name());

    let config = Arc::new(config);
    let registry = TaskRegistry::new();
    let store = ChunkStore::new(
        config.storage.chunks_dir.clone(),
        config.audio.chunk_duration_secs,
    );
    store.init().await?;

    let workers = WorkerPool::new(
        registry.clone(),
        store.clone(),
        Arc::clone(&engine),
        config.audio.chunk_duration_secs,
        config.performance.max_workers,
    );

    let state = AppState {
        registry,
        store,
        extractor: AudioExtractor::new(config.audio.target_sample_rate),
        workers,
        engine,
        config,
    };

    ApiServer::new(state).start().await
}
