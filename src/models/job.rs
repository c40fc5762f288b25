//! Retrieval job status and snapshot types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a retrieval session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a retrieval job.
///
/// Transitions are forward-only: `Idle` through the saving stages to
/// `Completed`, or to `Failed` from any non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "cause", rename_all = "snake_case")]
pub enum JobStatus {
    Idle,
    Starting,
    Downloading,
    SavingIds,
    SavingJson,
    SavingText,
    CreatingArchive,
    Completed,
    Failed(String),
}

impl JobStatus {
    /// Whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed(_))
    }

    /// Ordinal position in the forward-only ladder. `Failed` ranks above
    /// every working state so the never-regress invariant holds for it too.
    pub(crate) fn phase_index(&self) -> u8 {
        match self {
            JobStatus::Idle => 0,
            JobStatus::Starting => 1,
            JobStatus::Downloading => 2,
            JobStatus::SavingIds => 3,
            JobStatus::SavingJson => 4,
            JobStatus::SavingText => 5,
            JobStatus::CreatingArchive => 6,
            JobStatus::Completed => 7,
            JobStatus::Failed(_) => 8,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "idle"),
            JobStatus::Starting => write!(f, "starting"),
            JobStatus::Downloading => write!(f, "downloading"),
            JobStatus::SavingIds => write!(f, "saving ids"),
            JobStatus::SavingJson => write!(f, "saving json"),
            JobStatus::SavingText => write!(f, "saving text"),
            JobStatus::CreatingArchive => write!(f, "creating archive"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed(cause) => write!(f, "failed: {}", cause),
        }
    }
}

/// Output artifact kinds produced by a completed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Binary-encoded ordered PMID list
    Ids,
    /// Structured JSON document of all records
    Json,
    /// Directory of per-record text files
    Text,
    /// ZIP archive of the per-record text files
    Archive,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Ids => write!(f, "ids"),
            ArtifactKind::Json => write!(f, "json"),
            ArtifactKind::Text => write!(f, "text"),
            ArtifactKind::Archive => write!(f, "archive"),
        }
    }
}

/// Consistent point-in-time view of a job for pollers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Current lifecycle state
    pub status: JobStatus,
    /// Records fetched so far
    pub progress: usize,
    /// Target record count for the session
    pub total: usize,
}
