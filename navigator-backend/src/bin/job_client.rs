//! Job API smoke client
//!
//! Walks a running navigator server through the purchaser flow: agent
//! info, input schema, availability, start a job, then poll its status.
//!
//! Usage:
//!   NAVIGATOR_URL="http://localhost:8000" \
//!   TEST_SERVICE_TYPE="roadmap" \
//!   TEST_USER_ADDRESS="addr_test1..." \
//!   cargo run --bin job_client

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

const DEFAULT_ADDRESS: &str = "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt6ll2qzqf2d8swcyc2lqzqcqqqqqq";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct StartJobResponse {
    job_id: String,
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JobStatusResponse {
    status: String,
    result: Option<Value>,
    error: Option<String>,
}

async fn get_json(client: &Client, url: &str) -> Result<Value, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("GET {} failed: {}", url, e))?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("GET {} returned invalid JSON: {}", url, e))?;
    if !status.is_success() {
        return Err(format!("GET {} returned {}: {}", url, status, body));
    }
    Ok(body)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

async fn run(
    client: &Client,
    base_url: &str,
    service_type: &str,
    address: &str,
    max_polls: u32,
) -> Result<JobStatusResponse, String> {
    println!("\n1. Root endpoint");
    println!("{}", pretty(&get_json(client, &format!("{}/", base_url)).await?));

    println!("\n2. Input schema");
    println!("{}", pretty(&get_json(client, &format!("{}/input_schema", base_url)).await?));

    println!("\n3. Availability");
    println!("{}", pretty(&get_json(client, &format!("{}/availability", base_url)).await?));

    println!("\n4. Start job");
    let response = client
        .post(format!("{}/start_job", base_url))
        .json(&json!({
            "identifier_from_purchaser": "job_client",
            "input_data": {
                "type": service_type,
                "user_address": address
            }
        }))
        .send()
        .await
        .map_err(|e| format!("POST /start_job failed: {}", e))?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("POST /start_job returned {}: {}", status, body));
    }
    let started: StartJobResponse = response
        .json()
        .await
        .map_err(|e| format!("Invalid /start_job response: {}", e))?;
    println!("   {} ({}): {}", started.job_id, started.status, started.message);

    println!("\n5. Polling status");
    let status_url = format!("{}/status?job_id={}", base_url, started.job_id);
    for attempt in 1..=max_polls {
        let body = get_json(client, &status_url).await?;
        let job: JobStatusResponse = serde_json::from_value(body)
            .map_err(|e| format!("Invalid /status response: {}", e))?;
        println!("   [{}] {}", attempt, job.status);
        if job.status == "completed" || job.status == "failed" {
            return Ok(job);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    Err(format!("Job {} did not finish after {} polls", started.job_id, max_polls))
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("Job API smoke client");
    println!("====================");

    let base_url = env::var("NAVIGATOR_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .trim_end_matches('/')
        .to_string();
    let service_type = env::var("TEST_SERVICE_TYPE").unwrap_or_else(|_| "assessment".to_string());
    let address = env::var("TEST_USER_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());
    let max_polls = env::var("TEST_MAX_POLLS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);

    println!("   Server:  {}", base_url);
    println!("   Service: {}", service_type);
    println!("   Address: {}", address);

    let client = match Client::builder().timeout(Duration::from_secs(30)).build() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    match run(&client, &base_url, &service_type, &address, max_polls).await {
        Ok(job) if job.status == "completed" => {
            println!("\nSUCCESS");
            if let Some(result) = job.result {
                println!("{}", pretty(&result));
            }
        }
        Ok(job) => {
            println!("\nJOB FAILED");
            println!("{}", job.error.unwrap_or_default());
            std::process::exit(1);
        }
        Err(e) => {
            println!("\nERROR");
            println!("{}", e);
            std::process::exit(1);
        }
    }
}
