use serde_json::Value;
use std::sync::Arc;

use crate::crew::Crew;
use crate::errors::{ApiError, JobError};
use crate::jobs::store::JobStore;
use crate::models::{Job, ValidatedInput};

/// Submits jobs and drives them to a terminal state in the background
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    crew: Arc<Crew>,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, crew: Arc<Crew>) -> Self {
        Self { store, crew }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Record a pending job and start processing it.
    ///
    /// Returns as soon as the job is stored; crew failures end up in the
    /// job record, never here.
    pub fn submit(&self, identifier_from_purchaser: &str, input: ValidatedInput) -> Result<Job, ApiError> {
        let job = Job::new(identifier_from_purchaser);
        self.store.create(job.clone())?;

        log::info!(
            "[JOBS] Created job {} ({} for {})",
            job.job_id,
            input.service_type,
            input.user_address
        );

        let store = Arc::clone(&self.store);
        let crew = Arc::clone(&self.crew);
        let job_id = job.job_id.clone();
        tokio::spawn(async move {
            Self::process(store, crew, job_id, input).await;
        });

        Ok(job)
    }

    async fn process(store: Arc<dyn JobStore>, crew: Arc<Crew>, job_id: String, input: ValidatedInput) {
        if let Err(e) = store.update(&job_id, &mut |job: &mut Job| {
            job.start_processing();
            Ok(())
        }) {
            log::error!("[JOBS] Could not mark job {} as processing: {}", job_id, e);
            return;
        }

        // Run the crew on its own task so a panic is reported through the handle
        let crew_job_id = job_id.clone();
        let handle = tokio::spawn(async move {
            crew.process_job(
                &crew_job_id,
                input.service_type,
                &input.user_address,
                input.timeline,
            )
            .await
        });

        let outcome = match handle.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) if e.is_panic() => Err(format!("Processing panicked: {}", panic_message(e.into_panic()))),
            Err(e) => Err(format!("Processing was interrupted: {}", e)),
        };

        let written = match outcome {
            Ok(result) => {
                log::info!("[JOBS] Job {} completed", job_id);
                let mut result = Some(result);
                store.update(&job_id, &mut |job: &mut Job| {
                    if let Some(result) = result.take() {
                        job.complete(result);
                    }
                    Ok(())
                })
            }
            Err(message) => {
                log::error!("[JOBS] Job {} failed: {}", job_id, message);
                store.update(&job_id, &mut |job: &mut Job| {
                    job.fail(message.clone());
                    Ok(())
                })
            }
        };

        if let Err(e) = written {
            log::error!("[JOBS] Could not record outcome of job {}: {}", job_id, e);
        }
    }

    /// Hand additional data to a job that is waiting for it
    pub fn provide_input(&self, job_id: &str, additional_data: Value) -> Result<Job, JobError> {
        let mut data = Some(additional_data);
        let job = self.store.update(job_id, &mut |job: &mut Job| {
            job.resume_with_input(data.take().unwrap_or(Value::Null))
        })?;
        log::info!("[JOBS] Job {} resumed with additional input", job_id);
        Ok(job)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
