//! Job API endpoints
//!
//! Purchasers start a job, poll its status and, for jobs parked in
//! `waiting_for_input`, hand over additional data.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::controllers::{json_config, query_config};
use crate::errors::ApiError;
use crate::models::{ServiceRequest, ValidatedInput};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(web::resource("/start_job").route(web::post().to(start_job)))
        .service(web::resource("/status").route(web::get().to(get_status)))
        .service(web::resource("/provide_input").route(web::post().to(provide_input)));
}

#[derive(Debug, Deserialize)]
pub struct JobIdQuery {
    job_id: String,
}

async fn start_job(
    state: web::Data<AppState>,
    body: web::Json<ServiceRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let input = ValidatedInput::from_input_data(&request.input_data)?;
    let message = format!(
        "Processing {} request for {}",
        input.service_type, input.user_address
    );

    let job = state.runner.submit(&request.identifier_from_purchaser, input)?;

    Ok(HttpResponse::Ok().json(json!({
        "job_id": job.job_id,
        "status": "started",
        "message": message
    })))
}

async fn get_status(
    state: web::Data<AppState>,
    query: web::Query<JobIdQuery>,
) -> Result<HttpResponse, ApiError> {
    match state.store.get(&query.job_id)? {
        Some(job) => Ok(HttpResponse::Ok().json(job)),
        None => Err(ApiError::NotFound("Job not found".to_string())),
    }
}

async fn provide_input(
    state: web::Data<AppState>,
    query: web::Query<JobIdQuery>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    state
        .runner
        .provide_input(&query.job_id, Value::Object(body.into_inner()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Additional input provided, resuming processing"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_AGENT_ID;
    use crate::crew::executor::ScriptedExecutor;
    use crate::crew::{AgentConfig, AgentRoster, Crew, TaskExecutor, TaskSpec};
    use crate::errors::CrewError;
    use crate::jobs::{InMemoryJobStore, JobRunner, JobStore};
    use crate::models::{Job, JobStatus};
    use crate::tools::{create_default_registry, Tool, ToolContext};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    const ADDRESS: &str = "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt6ll2qzqf2d8swcyc2lqzqcqqqqqq";

    /// Holds every task until released
    struct GatedExecutor {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl TaskExecutor for GatedExecutor {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn execute(
            &self,
            agent: &AgentConfig,
            task: &TaskSpec,
            tools: &[Arc<dyn Tool>],
            context: &ToolContext,
        ) -> Result<String, CrewError> {
            self.gate.notified().await;
            ScriptedExecutor.execute(agent, task, tools, context).await
        }
    }

    fn app_state(executor: Arc<dyn TaskExecutor>) -> AppState {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let crew = Crew::new(
            AgentRoster::default(),
            Arc::new(create_default_registry()),
            executor,
            DEFAULT_AGENT_ID,
        );
        AppState {
            store: Arc::clone(&store),
            runner: JobRunner::new(store, Arc::new(crew)),
        }
    }

    fn start_request(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/start_job").set_json(body)
    }

    fn status_request(job_id: &str) -> test::TestRequest {
        test::TestRequest::get().uri(&format!("/status?job_id={}", job_id))
    }

    async fn wait_for_terminal(state: &AppState, job_id: &str) {
        for _ in 0..200 {
            if let Some(job) = state.store.get(job_id).unwrap() {
                if job.is_terminal() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never reached a terminal state", job_id);
    }

    #[actix_web::test]
    async fn test_assessment_job_completes() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            start_request(json!({
                "identifier_from_purchaser": "u1",
                "input_data": {"type": "assessment", "user_address": ADDRESS}
            }))
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "started");
        assert_eq!(
            body["message"],
            format!("Processing assessment request for {}", ADDRESS)
        );
        let job_id = body["job_id"].as_str().unwrap().to_string();

        wait_for_terminal(&state, &job_id).await;
        let status: Value =
            test::call_and_read_body_json(&app, status_request(&job_id).to_request()).await;
        assert_eq!(status["job_id"], job_id.as_str());
        assert_eq!(status["status"], "completed");
        assert_eq!(status["result"]["service"], "assessment");
        assert_eq!(status["result"]["success"], true);
        assert_eq!(status["result"]["agent_id"], DEFAULT_AGENT_ID);
        assert!(status["error"].is_null());
    }

    #[actix_web::test]
    async fn test_roadmap_defaults_to_six_months() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            start_request(json!({
                "identifier_from_purchaser": "u1",
                "input_data": {"type": "roadmap", "user_address": ADDRESS}
            }))
            .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        let job_id = body["job_id"].as_str().unwrap();
        wait_for_terminal(&state, job_id).await;
        let status: Value =
            test::call_and_read_body_json(&app, status_request(job_id).to_request()).await;

        assert_eq!(status["status"], "completed");
        assert_eq!(status["result"]["timeline"], "6-months");
    }

    #[actix_web::test]
    async fn test_status_before_completion() {
        let gate = Arc::new(Notify::new());
        let state = web::Data::new(app_state(Arc::new(GatedExecutor { gate: gate.clone() })));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let resp = test::call_service(
            &app,
            start_request(json!({
                "identifier_from_purchaser": "u1",
                "input_data": {"type": "catalyst", "user_address": ADDRESS}
            }))
            .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        let job_id = body["job_id"].as_str().unwrap().to_string();

        let status: Value =
            test::call_and_read_body_json(&app, status_request(&job_id).to_request()).await;
        assert!(status["status"] == "pending" || status["status"] == "processing");
        assert!(status["result"].is_null());

        gate.notify_one();
        wait_for_terminal(&state, &job_id).await;
        let status: Value =
            test::call_and_read_body_json(&app, status_request(&job_id).to_request()).await;
        assert_eq!(status["status"], "completed");
        assert_eq!(status["result"]["service"], "catalyst");
    }

    #[actix_web::test]
    async fn test_invalid_input_creates_no_job() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let cases = [
            (json!({"user_address": ADDRESS}), "Invalid service type"),
            (json!({"type": "mentoring", "user_address": ADDRESS}), "Invalid service type"),
            (json!({"type": "roadmap"}), "user_address is required"),
            (json!({"type": "assessment", "user_address": ""}), "user_address is required"),
        ];
        for (input_data, detail) in cases {
            let req = start_request(json!({
                "identifier_from_purchaser": "u1",
                "input_data": input_data
            }))
            .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["detail"], detail);
        }

        assert!(state.store.is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/start_job")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].is_string());

        let req = start_request(json!({"input_data": {"type": "assessment"}})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_job_is_not_found() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = status_request("never-issued").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Job not found");

        let req = test::TestRequest::get().uri("/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/provide_input?job_id=never-issued")
            .set_json(json!({"goal": "dev"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_provide_input_rejected_unless_waiting() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let pending = Job::new("u1");
        state.store.create(pending.clone()).unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/provide_input?job_id={}", pending.job_id))
            .set_json(json!({"goal": "dev"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Job is not waiting for input");

        let stored = state.store.get(&pending.job_id).unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Pending);
        assert!(stored.additional_input.is_none());
        assert_eq!(stored.updated_at, pending.updated_at);
    }

    #[actix_web::test]
    async fn test_provide_input_resumes_waiting_job() {
        let state = web::Data::new(app_state(Arc::new(ScriptedExecutor)));
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let mut parked = Job::new("u1");
        parked.await_input();
        state.store.create(parked.clone()).unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/provide_input?job_id={}", parked.job_id))
            .set_json(json!({"goal": "dev"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Additional input provided, resuming processing");

        let stored = state.store.get(&parked.job_id).unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Processing);
        assert_eq!(stored.additional_input, Some(json!({"goal": "dev"})));
    }
}
