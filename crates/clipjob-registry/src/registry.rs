//! Keyed job store shared by the executor, job tasks and HTTP handlers.
//!
//! Every mutation happens inside a single write guard, and readers receive
//! clones taken under a read guard, so a snapshot never shows a half-applied
//! update. The lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::RwLock;

use clipjob_models::{Job, JobId, JobPatch, StatusUpdate, TransitionError};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Number of jobs returned by [`JobRegistry::list`] when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Largest accepted list limit.
pub const MAX_LIST_LIMIT: usize = 200;

/// Parse a caller-supplied list limit.
///
/// Absent or unparseable values fall back to [`DEFAULT_LIST_LIMIT`]; parsed
/// values are clamped to `[1, MAX_LIST_LIMIT]`.
pub fn clamp_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.clamp(1, MAX_LIST_LIMIT as i64) as usize)
        .unwrap_or(DEFAULT_LIST_LIMIT)
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    job: Job,
}

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<JobId, Entry>,
    next_seq: u64,
}

/// Process-wide map from job id to job record.
#[derive(Debug, Default)]
pub struct JobRegistry {
    inner: RwLock<Inner>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job. Fails if the id is already taken.
    pub fn create(&self, job: Job) -> RegistryResult<()> {
        let mut inner = self.inner.write().expect("Poisoned lock");
        if inner.jobs.contains_key(&job.id) {
            return Err(RegistryError::DuplicateJob(job.id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(job.id.clone(), Entry { seq, job });
        Ok(())
    }

    /// Snapshot of a job.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        let inner = self.inner.read().expect("Poisoned lock");
        inner.jobs.get(id).map(|entry| entry.job.clone())
    }

    /// Apply a status change atomically.
    ///
    /// Unknown ids are ignored. An illegal transition leaves the job as it was
    /// and is reported back to the caller.
    pub fn set_status(&self, id: &JobId, update: StatusUpdate) -> Result<(), TransitionError> {
        let mut inner = self.inner.write().expect("Poisoned lock");
        match inner.jobs.get_mut(id) {
            Some(entry) => entry.job.apply(update),
            None => {
                debug!(job_id = %id, "Status update for unknown job ignored");
                Ok(())
            }
        }
    }

    /// Merge a partial update. Unknown ids and terminal jobs are ignored.
    pub fn merge_fields(&self, id: &JobId, patch: JobPatch) {
        let mut inner = self.inner.write().expect("Poisoned lock");
        match inner.jobs.get_mut(id) {
            Some(entry) => {
                if !entry.job.merge(patch) {
                    debug!(job_id = %id, status = %entry.job.status, "Patch on terminal job ignored");
                }
            }
            None => debug!(job_id = %id, "Patch for unknown job ignored"),
        }
    }

    /// Newest jobs first, at most `limit` of them.
    pub fn list(&self, limit: usize) -> Vec<Job> {
        let inner = self.inner.read().expect("Poisoned lock");
        let mut entries: Vec<&Entry> = inner.jobs.values().collect();
        entries.sort_by(|a, b| {
            b.job
                .created_at
                .cmp(&a.job.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        entries
            .into_iter()
            .take(limit)
            .map(|entry| entry.job.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("Poisoned lock").jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
