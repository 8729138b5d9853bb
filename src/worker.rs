use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::audio::load_waveform;
use crate::chunking::split_waveform;
use crate::error::{Result, TranscriberError};
use crate::registry::{TaskRegistry, TaskStatus};
use crate::store::ChunkStore;
use crate::transcription::Transcriber;

/// Dispatches one detached transcription worker per upload.
///
/// Workers run concurrently with the request cycle and with each other,
/// bounded by a semaphore. Each worker owns its task's registry entry
/// exclusively and reports completion only through the registry; the
/// dispatcher never waits for a result.
#[derive(Clone)]
pub struct WorkerPool {
    registry: TaskRegistry,
    store: ChunkStore,
    engine: Arc<dyn Transcriber>,
    chunk_duration_secs: u32,
    semaphore: Arc<Semaphore>,
    max_workers: usize,
}

#[derive(Debug, Clone)]
pub struct WorkerPoolStats {
    pub max_workers: usize,
    pub available_permits: usize,
}

impl WorkerPool {
    pub fn new(
        registry: TaskRegistry,
        store: ChunkStore,
        engine: Arc<dyn Transcriber>,
        chunk_duration_secs: u32,
        max_workers: usize,
    ) -> Self {
        info!("🔧 Initializing worker pool with {} workers", max_workers);
        Self {
            registry,
            store,
            engine,
            chunk_duration_secs,
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn stats(&self) -> WorkerPoolStats {
        WorkerPoolStats {
            max_workers: self.max_workers,
            available_permits: self.semaphore.available_permits(),
        }
    }

    /// Launch a worker for an already-registered task and return immediately.
    ///
    /// Any error after this point is recorded in the registry only; the
    /// request that triggered the dispatch has already returned.
    pub fn dispatch(&self, task_id: String, audio_path: PathBuf) {
        let pool = self.clone();
        tokio::spawn(async move {
            let _permit = match pool.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    pool.registry
                        .publish(
                            &task_id,
                            TaskStatus::Failed {
                                error: "worker pool shut down".to_string(),
                                percent: 0,
                            },
                        )
                        .await;
                    return;
                }
            };

            info!("🎬 Worker started for task {}", task_id);
            match pool.run_task(&task_id, &audio_path).await {
                Ok(()) => info!("🎉 Task {} completed", task_id),
                Err(e) => {
                    error!("❌ Task {} failed: {}", task_id, e);
                    pool.registry
                        .publish(
                            &task_id,
                            TaskStatus::Failed {
                                error: e.to_string(),
                                percent: 0,
                            },
                        )
                        .await;
                }
            }
        });
    }

    /// Run one task to completion: decode, split, transcribe chunk by chunk,
    /// persist the chunk record, publish the final result.
    async fn run_task(&self, task_id: &str, audio_path: &Path) -> Result<()> {
        self.registry
            .publish(
                task_id,
                TaskStatus::Processing {
                    progress: "Loading audio...".to_string(),
                    percent: 0,
                    chunks: Vec::new(),
                    current_chunk: None,
                },
            )
            .await;

        let waveform = {
            let path = audio_path.to_path_buf();
            tokio::task::spawn_blocking(move || load_waveform(&path))
                .await
                .map_err(|e| {
                    TranscriberError::Transcription(format!("audio load panicked: {}", e))
                })??
        };

        debug!(
            "Audio loaded for task {}: {:.2}s at {}Hz",
            task_id,
            waveform.duration().as_secs_f64(),
            waveform.sample_rate
        );

        let chunks = split_waveform(
            &waveform.samples,
            waveform.sample_rate,
            self.chunk_duration_secs,
        )?;
        let total_chunks = chunks.len();
        info!("✂️ Task {}: {} chunks to transcribe", task_id, total_chunks);

        let mut transcript_parts: Vec<String> = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let chunk_number = idx + 1;
            debug!(
                "Transcribing chunk {}/{} for task {}",
                chunk_number, total_chunks, task_id
            );

            // The engine call is CPU-bound; run it off the async runtime.
            let samples = chunk.to_vec();
            let engine = Arc::clone(&self.engine);
            let text = tokio::task::spawn_blocking(move || engine.transcribe(&samples))
                .await
                .map_err(|e| {
                    TranscriberError::Transcription(format!("inference panicked: {}", e))
                })??;

            let text = text.trim().to_string();
            if !text.is_empty() {
                transcript_parts.push(text.clone());
            }

            let percent = (chunk_number * 100 / total_chunks) as u8;
            self.registry
                .publish(
                    task_id,
                    TaskStatus::Processing {
                        progress: format!(
                            "Processing chunk {}/{} ({}%)",
                            chunk_number, total_chunks, percent
                        ),
                        percent,
                        // Published snapshot, detached from the accumulator.
                        chunks: transcript_parts.clone(),
                        current_chunk: Some(text),
                    },
                )
                .await;
        }

        let chunks_file = self.store.persist(task_id, &transcript_parts).await?;
        let transcription = transcript_parts.join(" ");

        self.registry
            .publish(
                task_id,
                TaskStatus::Completed {
                    transcription,
                    chunks: transcript_parts,
                    chunks_file: chunks_file.display().to_string(),
                    percent: 100,
                },
            )
            .await;

        Ok(())
    }
}
