//! Jobs table - persisted job records for the SQLite job store

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::db::sqlite::INTERRUPTED_ERROR;
use crate::db::Database;
use crate::errors::JobError;
use crate::models::{Job, JobStatus, ServiceResult};

const SELECT_JOB: &str = "SELECT job_id, identifier_from_purchaser, status, result_json, error,
        additional_input_json, created_at, updated_at
 FROM jobs
 WHERE job_id = ?1";

/// Raw column values, decoded outside the rusqlite row closure
struct JobRow {
    job_id: String,
    identifier_from_purchaser: String,
    status: String,
    result_json: Option<String>,
    error: Option<String>,
    additional_input_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl JobRow {
    fn into_job(self) -> Result<Job, JobError> {
        let status = self
            .status
            .parse::<JobStatus>()
            .map_err(|_| JobError::Storage(format!("Unknown job status '{}'", self.status)))?;

        let result = self
            .result_json
            .as_deref()
            .map(serde_json::from_str::<ServiceResult>)
            .transpose()
            .map_err(|e| JobError::Storage(format!("Corrupt result for job {}: {}", self.job_id, e)))?;

        let additional_input = self
            .additional_input_json
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| JobError::Storage(format!("Corrupt input for job {}: {}", self.job_id, e)))?;

        Ok(Job {
            job_id: self.job_id,
            status,
            result,
            error: self.error,
            identifier_from_purchaser: self.identifier_from_purchaser,
            additional_input,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, JobError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JobError::Storage(format!("Invalid timestamp '{}': {}", raw, e)))
}

fn to_json(value: Option<&impl serde::Serialize>) -> Result<Option<String>, JobError> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| JobError::Storage(e.to_string()))
}

fn read_job(conn: &Connection, job_id: &str) -> Result<Option<Job>, JobError> {
    let row = conn
        .query_row(SELECT_JOB, params![job_id], |row| {
            Ok(JobRow {
                job_id: row.get(0)?,
                identifier_from_purchaser: row.get(1)?,
                status: row.get(2)?,
                result_json: row.get(3)?,
                error: row.get(4)?,
                additional_input_json: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        })
        .optional()?;

    row.map(JobRow::into_job).transpose()
}

fn write_job(conn: &Connection, job: &Job) -> Result<(), JobError> {
    conn.execute(
        "UPDATE jobs
         SET status = ?1, result_json = ?2, error = ?3, additional_input_json = ?4, updated_at = ?5
         WHERE job_id = ?6",
        params![
            job.status.to_string(),
            to_json(job.result.as_ref())?,
            job.error,
            to_json(job.additional_input.as_ref())?,
            job.updated_at.to_rfc3339(),
            job.job_id,
        ],
    )?;
    Ok(())
}

impl Database {
    /// Insert a new job. Fails if the id is already taken.
    pub fn insert_job(&self, job: &Job) -> Result<(), JobError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO jobs (job_id, identifier_from_purchaser, status, result_json, error,
                               additional_input_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                job.job_id,
                job.identifier_from_purchaser,
                job.status.to_string(),
                to_json(job.result.as_ref())?,
                job.error,
                to_json(job.additional_input.as_ref())?,
                job.created_at.to_rfc3339(),
                job.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a job by id
    pub fn get_job(&self, job_id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.conn()?;
        read_job(&conn, job_id)
    }

    /// Read-modify-write a job while holding the connection lock.
    /// Nothing is written when `apply` fails.
    pub fn update_job(
        &self,
        job_id: &str,
        apply: &mut dyn FnMut(&mut Job) -> Result<(), JobError>,
    ) -> Result<Job, JobError> {
        let conn = self.conn()?;
        let mut job = read_job(&conn, job_id)?.ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        apply(&mut job)?;
        write_job(&conn, &job)?;
        Ok(job)
    }

    pub fn count_jobs(&self) -> Result<usize, JobError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Fail every job that is not in a terminal state. Nothing resumes work
    /// across restarts, so these would otherwise never finish.
    pub fn fail_interrupted_jobs(&self) -> Result<usize, JobError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE jobs
             SET status = ?1, error = ?2, result_json = NULL, updated_at = ?3
             WHERE status IN (?4, ?5, ?6)",
            params![
                JobStatus::Failed.to_string(),
                INTERRUPTED_ERROR,
                Utc::now().to_rfc3339(),
                JobStatus::Pending.to_string(),
                JobStatus::Processing.to_string(),
                JobStatus::WaitingForInput.to_string(),
            ],
        )?;
        Ok(updated)
    }
}
