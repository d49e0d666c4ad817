pub mod job;
pub mod service;

pub use job::{Job, JobStatus};
pub use service::{
    ServiceRequest, ServiceResult, ServiceType, ValidatedInput, DEFAULT_ROADMAP_TIMELINE,
    ROADMAP_TIMELINES,
};
