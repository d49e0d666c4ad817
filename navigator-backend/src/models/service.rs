use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::ApiError;

/// Timeline used for roadmaps when the purchaser does not pick one
pub const DEFAULT_ROADMAP_TIMELINE: &str = "6-months";

/// Timelines advertised in the input schema
pub const ROADMAP_TIMELINES: [&str; 3] = ["3-months", "6-months", "12-months"];

/// The services this agent sells
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceType {
    /// Skills assessment from wallet activity
    Assessment,
    /// Timeline-based career roadmap
    Roadmap,
    /// Project Catalyst proposal guidance
    Catalyst,
}

impl ServiceType {
    pub fn all() -> Vec<ServiceType> {
        ServiceType::iter().collect()
    }

    pub fn names() -> Vec<String> {
        ServiceType::iter().map(|s| s.to_string()).collect()
    }

    pub fn price(&self) -> &'static str {
        match self {
            ServiceType::Assessment => "0.5 ADA",
            ServiceType::Roadmap => "1.5 ADA",
            ServiceType::Catalyst => "3.0 ADA",
        }
    }

    pub fn estimated_time(&self) -> &'static str {
        match self {
            ServiceType::Assessment => "2-3 minutes",
            ServiceType::Roadmap => "3-5 minutes",
            ServiceType::Catalyst => "5-10 minutes",
        }
    }

    /// One-line description used in submission metadata
    pub fn summary(&self) -> &'static str {
        match self {
            ServiceType::Assessment => "Wallet activity analysis for skills assessment",
            ServiceType::Roadmap => "Personalized career roadmap generation",
            ServiceType::Catalyst => "Project Catalyst proposal guidance",
        }
    }
}

/// Body of `POST /start_job`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub identifier_from_purchaser: String,
    pub input_data: Map<String, Value>,
}

/// `input_data` after validation and defaulting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub service_type: ServiceType,
    pub user_address: String,
    pub timeline: Option<String>,
}

impl ValidatedInput {
    pub fn from_input_data(input_data: &Map<String, Value>) -> Result<Self, ApiError> {
        let service_type = input_data
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<ServiceType>().ok())
            .ok_or_else(|| ApiError::InvalidInput("Invalid service type".to_string()))?;

        let user_address = match input_data.get("user_address").and_then(|v| v.as_str()) {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => return Err(ApiError::InvalidInput("user_address is required".to_string())),
        };

        let timeline = match input_data.get("timeline") {
            None | Some(Value::Null) => None,
            Some(Value::String(t)) if t.is_empty() => None,
            Some(Value::String(t)) => Some(t.clone()),
            Some(_) => {
                return Err(ApiError::InvalidInput("timeline must be a string".to_string()));
            }
        };

        let timeline = match (service_type, timeline) {
            (ServiceType::Roadmap, None) => Some(DEFAULT_ROADMAP_TIMELINE.to_string()),
            (_, t) => t,
        };

        Ok(Self {
            service_type,
            user_address,
            timeline,
        })
    }
}

/// The `result` object of a completed job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult {
    pub success: bool,
    pub service: ServiceType,
    pub user_address: String,
    pub timeline: Option<String>,
    pub result: String,
    pub timestamp: String,
    pub agent_id: String,
}

impl ServiceResult {
    pub fn new(
        service: ServiceType,
        user_address: impl Into<String>,
        timeline: Option<String>,
        result: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            service,
            user_address: user_address.into(),
            timeline,
            result: result.into(),
            timestamp: Utc::now().to_rfc3339(),
            agent_id: agent_id.into(),
        }
    }
}
