//! Deployment packaging
//!
//! Writes the container and hosting platform files needed to run the
//! agent outside this repository, plus a submission summary for the
//! agent marketplace listing.
//!
//! The output directory doubles as the Docker build context, so it must be
//! the workspace root: the Dockerfile builds the whole workspace and ships
//! the roster from `navigator-backend/config`.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, DEFAULT_AGENT_ID, SAMPLE_ADDRESS};
use crate::crew::agents::ROSTER_FILE;
use crate::crew::executor::ScriptedExecutor;
use crate::crew::{AgentRoster, Crew};
use crate::models::ServiceType;
use crate::tools::create_default_registry;

const BINARY_NAME: &str = "navigator-backend";

/// Crate directory inside the build context
const CRATE_DIR: &str = "navigator-backend";

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {name}: {source}")]
    Encode {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preflight failed: {0}")]
    Preflight(String),
}

/// Everything `deploy` produced
#[derive(Debug)]
pub struct DeployReport {
    pub warnings: Vec<String>,
    pub checks: Vec<String>,
    pub files: Vec<PathBuf>,
}

/// Nearest ancestor of `start` holding a workspace `Cargo.toml`
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .map(|manifest| manifest.contains("[workspace]"))
                .unwrap_or(false)
        })
        .map(Path::to_path_buf)
}

/// Config directory the image ships, relative to the build context
pub fn shipped_config_dir(context: &Path) -> PathBuf {
    context.join(CRATE_DIR).join("config")
}

/// Check the environment, run every service once on the scripted executor,
/// then write all deployment artifacts to `out_dir`
pub async fn prepare(config: &Config, out_dir: &Path) -> Result<DeployReport, DeployError> {
    log::info!(
        "[DEPLOY] Preparing agent {} ({} on {})",
        config.agent_id,
        config.environment,
        config.cardano_network
    );

    let warnings = validate_environment(config, out_dir);
    for warning in &warnings {
        log::warn!("[DEPLOY] {}", warning);
    }

    let checks = preflight(&shipped_config_dir(out_dir)).await?;

    fs::create_dir_all(out_dir).map_err(|source| DeployError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let artifacts = [
        ("Dockerfile", dockerfile(config.port)),
        ("railway.json", to_pretty("railway.json", &railway_config())?),
        ("render.yaml", to_pretty("render.yaml", &render_config(config))?),
        ("Procfile", format!("web: {} serve\n", BINARY_NAME)),
        (
            "SUBMISSION_INFO.json",
            to_pretty("SUBMISSION_INFO.json", &submission_info(config))?,
        ),
        ("README_SUBMISSION.md", submission_readme(config)),
    ];

    let mut files = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = out_dir.join(name);
        fs::write(&path, content).map_err(|source| DeployError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("[DEPLOY] Wrote {:?}", path);
        files.push(path);
    }

    Ok(DeployReport {
        warnings,
        checks,
        files,
    })
}

/// Non-fatal problems that would degrade the deployed agent
pub fn validate_environment(config: &Config, context: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.openai_api_key.is_none() {
        warnings.push(
            "OPENAI_API_KEY is not set; jobs will run on the scripted executor".to_string(),
        );
    }

    if find_workspace_root(context).as_deref() != Some(context) {
        warnings.push(format!(
            "{:?} is not a workspace root; the Dockerfile will not build from it",
            context
        ));
    }

    let roster = shipped_config_dir(context).join(ROSTER_FILE);
    if !roster.exists() {
        warnings.push(format!(
            "Agent roster {:?} not found; built-in roles will be used",
            roster
        ));
    }

    warnings
}

/// Load the roster the image will ship and run each service through it
/// offline. Returns one line per service.
pub async fn preflight(config_dir: &Path) -> Result<Vec<String>, DeployError> {
    let roster = AgentRoster::load(config_dir).map_err(DeployError::Preflight)?;
    let crew = Crew::new(
        roster,
        Arc::new(create_default_registry()),
        Arc::new(ScriptedExecutor),
        DEFAULT_AGENT_ID,
    );
    crew.validate()
        .map_err(|e| DeployError::Preflight(e.to_string()))?;

    let mut checks = Vec::new();
    for service in ServiceType::all() {
        let result = crew
            .process_request(service, SAMPLE_ADDRESS, None)
            .await
            .map_err(|e| DeployError::Preflight(format!("{}: {}", service, e)))?;
        log::info!("[DEPLOY] Preflight {} ok ({} chars)", service, result.result.len());
        checks.push(format!("{} ok", service));
    }
    Ok(checks)
}

fn to_pretty(name: &'static str, value: &Value) -> Result<String, DeployError> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|source| DeployError::Encode { name, source })
}

fn dockerfile(port: u16) -> String {
    format!(
        r#"FROM rust:1-slim AS builder

WORKDIR /app

RUN apt-get update && apt-get install -y pkg-config libssl-dev \
    && rm -rf /var/lib/apt/lists/*

COPY . .
RUN cargo build --release --bin {bin}

FROM debian:bookworm-slim

RUN apt-get update && apt-get install -y ca-certificates curl libssl3 \
    && rm -rf /var/lib/apt/lists/*

WORKDIR /app
COPY --from=builder /app/target/release/{bin} /usr/local/bin/{bin}
COPY {crate_dir}/config ./config

ENV PORT={port}
ENV NAVIGATOR_CONFIG_DIR=/app/config
EXPOSE {port}

HEALTHCHECK --interval=30s --timeout=10s --start-period=5s --retries=3 \
    CMD curl -f http://localhost:{port}/availability || exit 1

CMD ["{bin}", "serve"]
"#,
        bin = BINARY_NAME,
        crate_dir = CRATE_DIR,
        port = port
    )
}

fn railway_config() -> Value {
    json!({
        "build": {
            "builder": "DOCKERFILE"
        },
        "deploy": {
            "startCommand": format!("{} serve", BINARY_NAME),
            "healthcheckPath": "/availability"
        }
    })
}

fn render_config(config: &Config) -> Value {
    json!({
        "services": [
            {
                "type": "web",
                "name": config.agent_id,
                "env": "docker",
                "dockerfilePath": "./Dockerfile",
                "healthCheckPath": "/availability",
                "envVars": [
                    {"key": "OPENAI_API_KEY", "sync": false},
                    {"key": "MASUMI_AGENT_ID", "value": config.agent_id},
                    {"key": "CARDANO_NETWORK", "value": config.cardano_network}
                ]
            }
        ]
    })
}

fn submission_info(config: &Config) -> Value {
    let services: Map<String, Value> = ServiceType::all()
        .into_iter()
        .map(|s| (s.to_string(), json!(format!("{} - {}", s.price(), s.summary()))))
        .collect();

    json!({
        "agent_name": "Cardano Career Navigator",
        "agent_id": config.agent_id,
        "description": "Multi-agent service providing personalized Cardano ecosystem career guidance",
        "framework": "actix-web + tokio",
        "network": config.cardano_network,
        "environment": config.environment,
        "use_case": {
            "web2": "Career guidance, skills assessment, personalized learning paths",
            "web3": "On-chain analysis, Cardano integration, NFT achievements, eSIM rewards"
        },
        "services": services,
        "unique_features": [
            "Begin Wallet integration for progress tracking",
            "eSIM rewards for learning milestones",
            "On-chain achievement NFTs",
            "Real-time Catalyst opportunity matching",
            "Cardano-specific career paths"
        ],
        "api_endpoints": [
            "GET / - Agent information",
            "GET /input_schema - Input requirements",
            "GET /availability - Service availability",
            "POST /start_job - Start AI task",
            "GET /status - Job status",
            "POST /provide_input - Provide additional input"
        ],
        "deployment_options": ["Railway", "Render", "Heroku", "Docker"],
        "submission_date": Utc::now().to_rfc3339()
    })
}

fn submission_readme(config: &Config) -> String {
    let services: String = ServiceType::all()
        .into_iter()
        .map(|s| format!("| `{}` | {} | {} | {} |\n", s, s.price(), s.estimated_time(), s.summary()))
        .collect();

    format!(
        r#"# Cardano Career Navigator

Agent `{agent_id}` on the Cardano `{network}` network.

Personalized Cardano ecosystem career guidance from three agents: a career
analyst reading wallet activity, a roadmap specialist and a Project Catalyst
advisor.

## Services

| Service | Price | Estimated time | Description |
|---------|-------|----------------|-------------|
{services}
## API

- `GET /` - Agent information
- `GET /input_schema` - Service input requirements
- `GET /availability` - Service availability
- `POST /start_job` - Start a job
- `GET /status?job_id=<id>` - Job status
- `POST /provide_input?job_id=<id>` - Provide additional input

## Running

```bash
cp .env.example .env   # set OPENAI_API_KEY to use the LLM executor
{bin} run --type roadmap --timeline 3-months
{bin} serve
```

## Deploying

Build from the workspace root:

```bash
docker build -t {agent_id} .
docker run -p {port}:{port} -e OPENAI_API_KEY {agent_id}
```

Railway picks up `railway.json`, Render uses `render.yaml` and Heroku-style
hosts run the `Procfile`.
"#,
        agent_id = config.agent_id,
        network = config.cardano_network,
        services = services,
        bin = BINARY_NAME,
        port = config.port
    )
}
