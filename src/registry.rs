use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The full state of one transcription task as polled by clients.
///
/// Serialized with a `status` tag, so every snapshot a client reads is one of
/// queued / processing / completed / failed with exactly the fields of that
/// state. Entries are replaced wholesale on every update; fields from two
/// different updates can never mix in one read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TaskStatus {
    Queued {
        progress: String,
        percent: u8,
    },
    Processing {
        progress: String,
        percent: u8,
        /// Snapshot copy of all finished chunk texts, in chunk order.
        chunks: Vec<String>,
        /// The just-finished chunk, absent on the initial audio-loading update.
        #[serde(skip_serializing_if = "Option::is_none")]
        current_chunk: Option<String>,
    },
    Completed {
        transcription: String,
        chunks: Vec<String>,
        chunks_file: String,
        percent: u8,
    },
    Failed {
        error: String,
        percent: u8,
    },
}

impl TaskStatus {
    /// Initial state seeded at upload time.
    pub fn queued() -> Self {
        TaskStatus::Queued {
            progress: "Starting transcription...".to_string(),
            percent: 0,
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            TaskStatus::Queued { percent, .. }
            | TaskStatus::Processing { percent, .. }
            | TaskStatus::Completed { percent, .. }
            | TaskStatus::Failed { percent, .. } => *percent,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed { .. } | TaskStatus::Failed { .. }
        )
    }
}

/// Process-wide mapping from task id to task state.
///
/// Each worker owns exclusive write access to its own entry; polling clients
/// read concurrently and always see a self-consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<String, TaskStatus>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `task_id` wholesale.
    pub async fn publish(&self, task_id: &str, status: TaskStatus) {
        self.tasks
            .write()
            .await
            .insert(task_id.to_string(), status);
    }

    /// Snapshot of the current entry, if the task exists.
    pub async fn get(&self, task_id: &str) -> Option<TaskStatus> {
        self.tasks.read().await.get(task_id).cloned()
    }

    pub async fn contains(&self, task_id: &str) -> bool {
        self.tasks.read().await.contains_key(task_id)
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}
