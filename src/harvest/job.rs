//! Background retrieval sessions.
//!
//! One spawned task per session. The worker owns all network and file I/O
//! and touches the shared state only through short lock scopes; pollers
//! take the same lock to read a consistent snapshot. Nothing holds the
//! lock across an await point or a write to disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::client::EutilsClient;
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::harvest::{output, partition, window};
use crate::models::{ArticleRecord, ArtifactKind, JobId, JobSnapshot, JobStatus};

struct JobState {
    status: JobStatus,
    progress: usize,
    total: usize,
    artifacts: HashMap<ArtifactKind, PathBuf>,
    last_activity: Instant,
}

/// Handle to a running or finished retrieval session.
///
/// Cheap to poll; every snapshot refreshes the activity timestamp so an
/// external reaper keyed on idleness stays correct.
pub struct JobHandle {
    id: JobId,
    state: Arc<Mutex<JobState>>,
    worker: JoinHandle<()>,
}

impl JobHandle {
    /// Session identifier (also names the output directory)
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Consistent point-in-time view of the session
    pub fn snapshot(&self) -> JobSnapshot {
        let mut state = self.state.lock().unwrap();
        state.last_activity = Instant::now();
        JobSnapshot {
            status: state.status.clone(),
            progress: state.progress,
            total: state.total,
        }
    }

    /// Time since the session was launched or last polled
    pub fn idle_for(&self) -> Duration {
        self.state.lock().unwrap().last_activity.elapsed()
    }

    /// Location of an output artifact, available once the session has
    /// completed
    pub fn artifact_path(&self, kind: ArtifactKind) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        if state.status != JobStatus::Completed {
            return None;
        }
        state.artifacts.get(&kind).cloned()
    }

    /// Whether the worker task has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker task to finish
    pub async fn join(&mut self) {
        let _ = (&mut self.worker).await;
    }

    /// Surrender the worker task handle, e.g. to abort it
    pub fn into_join_handle(self) -> JoinHandle<()> {
        self.worker
    }
}

/// Entry point for one retrieval session
pub struct HarvestJob;

impl HarvestJob {
    /// Launch a session in the background and return immediately.
    ///
    /// The worker walks the coarse window ladder, retrieves up to
    /// `max_results` records (everything available when `None`), and
    /// persists the output artifacts into a session-unique directory under
    /// the configured output root.
    pub fn spawn(
        client: EutilsClient,
        config: &HarvestConfig,
        query: &str,
        max_results: Option<usize>,
    ) -> JobHandle {
        let id = JobId::new();
        let state = Arc::new(Mutex::new(JobState {
            status: JobStatus::Idle,
            progress: 0,
            total: 0,
            artifacts: HashMap::new(),
            last_activity: Instant::now(),
        }));

        let session_dir = config.output_root.join(id.to_string());
        let page_size = config.page_size;
        let query = query.to_string();
        let worker_state = Arc::clone(&state);

        let worker = tokio::spawn(async move {
            let outcome = run_session(
                &client,
                &worker_state,
                &query,
                max_results,
                &session_dir,
                page_size,
            )
            .await;

            if let Err(err) = outcome {
                error!(%err, "harvest session failed");
                let mut state = worker_state.lock().unwrap();
                state.status = JobStatus::Failed(err.to_string());
            }
        });

        JobHandle { id, state, worker }
    }
}

async fn run_session(
    client: &EutilsClient,
    state: &Mutex<JobState>,
    query: &str,
    max_results: Option<usize>,
    session_dir: &Path,
    page_size: usize,
) -> Result<()> {
    set_status(state, JobStatus::Starting);

    std::fs::create_dir_all(session_dir)?;
    let ids_path = session_dir.join(output::IDS_FILE);
    let json_path = session_dir.join(output::JSON_FILE);
    let text_dir = session_dir.join(output::TEXT_DIR);
    let archive_path = session_dir.join(output::ARCHIVE_FILE);
    {
        let mut state = state.lock().unwrap();
        state.artifacts.insert(ArtifactKind::Ids, ids_path.clone());
        state.artifacts.insert(ArtifactKind::Json, json_path.clone());
        state.artifacts.insert(ArtifactKind::Text, text_dir.clone());
        state
            .artifacts
            .insert(ArtifactKind::Archive, archive_path.clone());
    }

    let overall = client.search(query).await?;
    let budget = match max_results {
        Some(max) => max.min(overall.count),
        None => overall.count,
    };
    {
        let mut state = state.lock().unwrap();
        state.total = budget;
        state.status = JobStatus::Downloading;
    }
    info!(query, available = overall.count, budget, "harvest started");

    let today = chrono::Utc::now().date_naive();
    let mut records: Vec<ArticleRecord> = Vec::new();
    for window in window::coarse_ladder(today) {
        if records.len() >= budget {
            break;
        }
        let remaining = budget - records.len();
        let batch = partition::load_window(client, query, window, remaining, page_size).await?;
        records.extend(batch);
        {
            let mut state = state.lock().unwrap();
            state.progress = records.len();
        }
        info!(%window, fetched = records.len(), total = budget, "window complete");
    }

    set_status(state, JobStatus::SavingIds);
    output::write_id_list(&ids_path, &records)?;

    set_status(state, JobStatus::SavingJson);
    output::write_json_document(&json_path, &records)?;

    set_status(state, JobStatus::SavingText);
    output::write_text_files(&text_dir, &records)?;

    set_status(state, JobStatus::CreatingArchive);
    output::write_archive(&archive_path, &text_dir)?;

    set_status(state, JobStatus::Completed);
    info!(records = records.len(), dir = %session_dir.display(), "harvest complete");
    Ok(())
}

fn set_status(state: &Mutex<JobState>, status: JobStatus) {
    let mut state = state.lock().unwrap();
    debug_assert!(
        status.phase_index() >= state.status.phase_index(),
        "status may not regress"
    );
    state.status = status;
}
