//! Job storage behind a small keyed-store interface
//!
//! The HTTP layer and the runner only see `dyn JobStore`, so the backing
//! store can be swapped (in-memory map, SQLite) or replaced in tests.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::Database;
use crate::errors::JobError;
use crate::models::Job;

/// Keyed store for job records
pub trait JobStore: Send + Sync {
    /// Insert a new job. The id must not exist yet.
    fn create(&self, job: Job) -> Result<(), JobError>;

    /// Look up a job by id
    fn get(&self, job_id: &str) -> Result<Option<Job>, JobError>;

    /// Apply a mutation to one job atomically and return the new record.
    /// If `apply` fails the stored job is left as it was.
    fn update(
        &self,
        job_id: &str,
        apply: &mut dyn FnMut(&mut Job) -> Result<(), JobError>,
    ) -> Result<Job, JobError>;

    /// Number of stored jobs
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local job store. No eviction, no size bound.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<String, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn create(&self, job: Job) -> Result<(), JobError> {
        match self.jobs.entry(job.job_id.clone()) {
            Entry::Occupied(_) => Err(JobError::Storage(format!(
                "Job '{}' already exists",
                job.job_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    fn get(&self, job_id: &str) -> Result<Option<Job>, JobError> {
        Ok(self.jobs.get(job_id).map(|job| job.value().clone()))
    }

    fn update(
        &self,
        job_id: &str,
        apply: &mut dyn FnMut(&mut Job) -> Result<(), JobError>,
    ) -> Result<Job, JobError> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        // Mutate a copy so a failed transition leaves the stored job intact
        let mut updated = entry.value().clone();
        apply(&mut updated)?;
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

impl JobStore for Database {
    fn create(&self, job: Job) -> Result<(), JobError> {
        self.insert_job(&job)
    }

    fn get(&self, job_id: &str) -> Result<Option<Job>, JobError> {
        self.get_job(job_id)
    }

    fn update(
        &self,
        job_id: &str,
        apply: &mut dyn FnMut(&mut Job) -> Result<(), JobError>,
    ) -> Result<Job, JobError> {
        self.update_job(job_id, apply)
    }

    fn len(&self) -> usize {
        self.count_jobs().unwrap_or_else(|e| {
            log::warn!("[JOBS] Failed to count jobs: {}", e);
            0
        })
    }
}
