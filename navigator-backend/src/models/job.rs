use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use uuid::Uuid;

use super::service::ServiceResult;
use crate::errors::JobError;

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    WaitingForInput,
    Completed,
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One purchased service request tracked through its lifecycle.
///
/// Only `job_id`, `status`, `result` and `error` are part of the status
/// response; the remaining fields are bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub result: Option<ServiceResult>,
    pub error: Option<String>,
    #[serde(skip)]
    pub identifier_from_purchaser: String,
    #[serde(skip)]
    pub additional_input: Option<Value>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(identifier_from_purchaser: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            result: None,
            error: None,
            identifier_from_purchaser: identifier_from_purchaser.into(),
            additional_input: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn start_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Mark as completed with result
    pub fn complete(&mut self, result: ServiceResult) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
    }

    /// Mark as failed with error
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.result = None;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Park the job until the purchaser supplies more data
    pub fn await_input(&mut self) {
        self.status = JobStatus::WaitingForInput;
        self.updated_at = Utc::now();
    }

    /// Accept additional input and resume. Leaves the job untouched unless
    /// it is waiting for input.
    pub fn resume_with_input(&mut self, additional_data: Value) -> Result<(), JobError> {
        if self.status != JobStatus::WaitingForInput {
            return Err(JobError::InvalidState {
                job_id: self.job_id.clone(),
                status: self.status.to_string(),
            });
        }
        self.additional_input = Some(additional_data);
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceType;
    use serde_json::json;

    #[test]
    fn test_new_job_is_pending() {
        let job = Job::new("u1");
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(Uuid::parse_str(&job.job_id).is_ok());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(json!(JobStatus::WaitingForInput), json!("waiting_for_input"));
        assert_eq!("waiting_for_input".parse::<JobStatus>().unwrap(), JobStatus::WaitingForInput);
        assert_eq!(JobStatus::Processing.to_string(), "processing");
    }

    #[test]
    fn test_serialized_shape() {
        let job = Job::new("u1");
        let value = serde_json::to_value(&job).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["status"], json!("pending"));
        assert!(obj["result"].is_null());
        assert!(obj["error"].is_null());
    }

    #[test]
    fn test_terminal_states_are_exclusive() {
        let mut job = Job::new("u1");
        job.start_processing();
        job.fail("boom");
        assert!(job.is_terminal());
        assert!(job.result.is_none());

        job.complete(ServiceResult::new(ServiceType::Assessment, "addr1", None, "ok", "agent"));
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_resume_requires_waiting_for_input() {
        let mut job = Job::new("u1");
        job.start_processing();
        let err = job.resume_with_input(json!({"goal": "dev"})).unwrap_err();
        assert!(matches!(err, JobError::InvalidState { .. }));
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.additional_input.is_none());

        job.await_input();
        job.resume_with_input(json!({"goal": "dev"})).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.additional_input, Some(json!({"goal": "dev"})));
    }
}
