//! Error types shared across the job API, the job store and the crew.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "detail": self.to_string()
        }))
    }
}

/// Errors from job store operations and job state transitions.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found")]
    NotFound(String),

    #[error("Job is not waiting for input")]
    InvalidState { job_id: String, status: String },

    #[error("Job store error: {0}")]
    Storage(String),
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => ApiError::NotFound(err.to_string()),
            JobError::InvalidState { .. } => ApiError::InvalidState(err.to_string()),
            JobError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<rusqlite::Error> for JobError {
    fn from(err: rusqlite::Error) -> Self {
        JobError::Storage(err.to_string())
    }
}

/// Failures while running a service request through the crew.
///
/// These never reach the `/start_job` caller; the job runner records the
/// rendered message in the job's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrewError {
    #[error("Agent '{agent}' references unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("Task execution failed: {0}")]
    Executor(String),

    #[error("Agent '{agent}' did not finish within {limit} iterations")]
    IterationLimit { agent: String, limit: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidState("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_job_error_conversion() {
        let api: ApiError = JobError::NotFound("abc".into()).into();
        assert!(matches!(api, ApiError::NotFound(ref m) if m == "Job not found"));

        let api: ApiError = JobError::InvalidState {
            job_id: "abc".into(),
            status: "pending".into(),
        }
        .into();
        assert!(matches!(api, ApiError::InvalidState(ref m) if m == "Job is not waiting for input"));
    }
}
