use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_AGENT_ID: &str = "cardano-career-navigator";

/// Testnet wallet used for local runs and the deploy preflight
pub const SAMPLE_ADDRESS: &str =
    "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt6ll2qzqf2d8swcyc2lqzqcqqqqqq";

#[derive(Debug, Error)]
#[error("{name} must be a valid {expected}, got '{value}'")]
pub struct ConfigError {
    name: &'static str,
    expected: &'static str,
    value: String,
}

/// Where job records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStoreKind {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub config_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub llm_endpoint: Option<String>,
    pub llm_model: Option<String>,
    pub llm_max_tokens: u32,
    pub crew_max_iterations: u32,
    /// Force the scripted executor even when an API key is present
    pub offline: bool,
    pub agent_id: String,
    pub cardano_network: String,
    pub environment: String,
    pub job_store: JobStoreKind,
    pub database_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            config_dir: PathBuf::from("./config"),
            openai_api_key: None,
            llm_endpoint: None,
            llm_model: None,
            llm_max_tokens: 4096,
            crew_max_iterations: 10,
            offline: false,
            agent_id: DEFAULT_AGENT_ID.to_string(),
            cardano_network: "preprod".to_string(),
            environment: "development".to_string(),
            job_store: JobStoreKind::Memory,
            database_url: "./.db/jobs.db".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let job_store = match non_empty("JOB_STORE").as_deref().map(str::to_lowercase) {
            None => defaults.job_store,
            Some(kind) if kind == "memory" => JobStoreKind::Memory,
            Some(kind) if kind == "sqlite" => JobStoreKind::Sqlite,
            Some(other) => {
                return Err(ConfigError {
                    name: "JOB_STORE",
                    expected: "store kind (memory|sqlite)",
                    value: other,
                });
            }
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", "port number", defaults.port)?,
            config_dir: non_empty("NAVIGATOR_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_dir),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            llm_endpoint: non_empty("LLM_ENDPOINT"),
            llm_model: non_empty("LLM_MODEL"),
            llm_max_tokens: parse_var("LLM_MAX_TOKENS", "token count", defaults.llm_max_tokens)?,
            crew_max_iterations: require_positive(
                "CREW_MAX_ITERATIONS",
                "iteration count above zero",
                parse_var("CREW_MAX_ITERATIONS", "iteration count", defaults.crew_max_iterations)?,
            )?,
            offline: non_empty("NAVIGATOR_OFFLINE")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.offline),
            agent_id: non_empty("MASUMI_AGENT_ID").unwrap_or(defaults.agent_id),
            cardano_network: non_empty("CARDANO_NETWORK").unwrap_or(defaults.cardano_network),
            environment: non_empty("APP_ENV")
                .or_else(|| non_empty("NODE_ENV"))
                .unwrap_or(defaults.environment),
            job_store,
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
        })
    }

    /// True when jobs should go through the LLM executor
    pub fn uses_llm(&self) -> bool {
        self.openai_api_key.is_some() && !self.offline
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError {
            name,
            expected,
            value,
        }),
    }
}

fn require_positive(name: &'static str, expected: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError {
            name,
            expected,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
