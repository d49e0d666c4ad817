//! SQLite database - schema definitions and connection management
//!
//! Job persistence lives in `tables/jobs.rs`; this file only owns the
//! connection and the schema.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::errors::JobError;

/// Error recorded on jobs that were in flight when the process stopped
pub const INTERRUPTED_ERROR: &str = "Processing was interrupted by a restart";

/// Main database wrapper with connection pooling via Mutex
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database, initialize schema and fail any job that was
    /// still in flight when the previous process stopped
    pub fn new(database_url: &str) -> Result<Self, JobError> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    JobError::Storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let db = Self::from_connection(Connection::open(database_url)?)?;
        let interrupted = db.fail_interrupted_jobs()?;
        if interrupted > 0 {
            log::warn!("[JOBS] Marked {} interrupted jobs as failed", interrupted);
        }
        Ok(db)
    }

    #[cfg(test)]
    pub fn in_memory() -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqliteResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, JobError> {
        self.conn
            .lock()
            .map_err(|_| JobError::Storage("database connection lock poisoned".to_string()))
    }
}

fn init_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS jobs (
            job_id TEXT PRIMARY KEY,
            identifier_from_purchaser TEXT NOT NULL,
            status TEXT NOT NULL,
            result_json TEXT,
            error TEXT,
            additional_input_json TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, JobStatus};

    #[test]
    fn test_jobs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobs.db");
        let url = path.to_string_lossy().to_string();

        let job = Job::new("u1");
        {
            let db = Database::new(&url).unwrap();
            db.insert_job(&job).unwrap();
        }

        let reopened = Database::new(&url).unwrap();
        let loaded = reopened.get_job(&job.job_id).unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Pending);
        assert_eq!(loaded.identifier_from_purchaser, "u1");
    }

    #[test]
    fn test_reopen_fails_in_flight_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("jobs.db").to_string_lossy().to_string();

        let mut processing = Job::new("u1");
        processing.start_processing();
        let mut waiting = Job::new("u2");
        waiting.await_input();
        let mut done = Job::new("u3");
        done.fail("boom");
        {
            let db = Database::new(&url).unwrap();
            for job in [&processing, &waiting, &done] {
                db.insert_job(job).unwrap();
            }
        }

        let reopened = Database::new(&url).unwrap();
        for id in [&processing.job_id, &waiting.job_id] {
            let job = reopened.get_job(id).unwrap().unwrap();
            assert_eq!(job.status, JobStatus::Failed);
            assert_eq!(job.error.as_deref(), Some(INTERRUPTED_ERROR));
            assert!(job.result.is_none());
        }
        let untouched = reopened.get_job(&done.job_id).unwrap().unwrap();
        assert_eq!(untouched.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_unwritable_parent_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let url = blocker.join("jobs.db").to_string_lossy().to_string();

        let err = Database::new(&url).err().unwrap();
        assert!(matches!(err, JobError::Storage(ref msg) if msg.starts_with("Failed to create")));
    }
}
