use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{Result, TranscriberError};

/// One finalized chunk in a persisted record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkEntry {
    /// 1-based position in the transcription
    pub chunk_number: usize,
    pub text: String,
    /// Nominal time range, derived from the configured chunk duration
    pub timestamp: String,
}

/// Durable record of every chunk text for a completed task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    pub task_id: String,
    pub total_chunks: usize,
    pub chunks: Vec<ChunkEntry>,
}

/// Writes and reads chunk records, one JSON file per task id.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    chunks_dir: PathBuf,
    chunk_duration_secs: u32,
}

impl ChunkStore {
    pub fn new(chunks_dir: PathBuf, chunk_duration_secs: u32) -> Self {
        Self {
            chunks_dir,
            chunk_duration_secs,
        }
    }

    /// Create the chunks directory if it does not exist.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.chunks_dir).await?;
        Ok(())
    }

    pub fn record_path(&self, task_id: &str) -> PathBuf {
        self.chunks_dir.join(format!("{}_chunks.json", task_id))
    }

    /// Persist the full record for a task in one atomic operation.
    ///
    /// Timestamp ranges are `index * duration` regardless of the final
    /// chunk's actual length. A repeated persist for the same id overwrites
    /// the prior record.
    pub async fn persist(&self, task_id: &str, chunk_texts: &[String]) -> Result<PathBuf> {
        let record = self.build_record(task_id, chunk_texts);
        let path = self.record_path(task_id);

        // Write to a sibling temp file, then rename over the final path so
        // readers never observe a partially written record.
        let tmp_path = self.chunks_dir.join(format!("{}_chunks.json.tmp", task_id));
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &path).await?;

        info!("💾 Chunks saved to: {}", path.display());
        Ok(path)
    }

    /// Read the persisted record for a task.
    pub async fn retrieve(&self, task_id: &str) -> Result<ChunkRecord> {
        let path = self.record_path(task_id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscriberError::NotFound(
                    "Chunks file not found".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let record: ChunkRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    fn build_record(&self, task_id: &str, chunk_texts: &[String]) -> ChunkRecord {
        let duration = self.chunk_duration_secs as usize;
        let chunks = chunk_texts
            .iter()
            .enumerate()
            .map(|(idx, text)| ChunkEntry {
                chunk_number: idx + 1,
                text: text.clone(),
                timestamp: format!("{}-{}s", idx * duration, (idx + 1) * duration),
            })
            .collect();

        ChunkRecord {
            task_id: task_id.to_string(),
            total_chunks: chunk_texts.len(),
            chunks,
        }
    }
}
