//! Project Catalyst opportunity lookup
//!
//! Returns the funding categories that match a skill profile. The feed is a
//! fixed snapshot of the current round.

use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const NAME: &str = "catalyst_opportunity_tool";

pub struct CatalystOpportunityTool {
    definition: ToolDefinition,
}

impl CatalystOpportunityTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "user_skills".to_string(),
            PropertySchema::string("Comma separated skills of the user (e.g. 'staking, defi')"),
        );
        properties.insert(
            "experience_level".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Experience level of the user".to_string(),
                default: Some(json!("intermediate")),
                enum_values: Some(vec![
                    "beginner".to_string(),
                    "intermediate".to_string(),
                    "advanced".to_string(),
                ]),
            },
        );

        CatalystOpportunityTool {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Fetches current Project Catalyst opportunities matching user profile".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["user_skills".to_string(), "experience_level".to_string()],
                },
            },
        }
    }

    fn opportunities() -> Value {
        json!([
            {
                "round": "Fund 12",
                "category": "Developer Tools",
                "budget": "50000 ADA",
                "deadline": "2025-02-15",
                "match_reason": "development skills"
            },
            {
                "round": "Fund 12",
                "category": "Real World Adoption",
                "budget": "75000 ADA",
                "deadline": "2025-02-15",
                "match_reason": "begin-wallet integration"
            }
        ])
    }
}

impl Default for CatalystOpportunityTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CatalystOpportunityParams {
    #[serde(default)]
    user_skills: Option<Value>,
    #[serde(default = "default_experience_level")]
    experience_level: String,
}

fn default_experience_level() -> String {
    "intermediate".to_string()
}

#[async_trait]
impl Tool for CatalystOpportunityTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> ToolResult {
        let params: CatalystOpportunityParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        log::info!(
            "[{}] Looking up opportunities for {} profile (skills: {})",
            NAME,
            params.experience_level,
            params.user_skills.map(|s| s.to_string()).unwrap_or_else(|| "unspecified".to_string())
        );
        ToolResult::json(&Self::opportunities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_fund_12_opportunities() {
        let tool = CatalystOpportunityTool::new();
        let result = tool
            .execute(
                json!({"user_skills": "staking, defi", "experience_level": "advanced"}),
                &ToolContext::new(),
            )
            .await;
        assert!(result.success);
        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        let rounds = parsed.as_array().unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0]["category"], "Developer Tools");
        assert_eq!(rounds[1]["budget"], "75000 ADA");
    }

    #[tokio::test]
    async fn test_accepts_skill_arrays_and_missing_fields() {
        let tool = CatalystOpportunityTool::new();
        let context = ToolContext::new();
        assert!(tool.execute(json!({"user_skills": ["defi"]}), &context).await.success);
        assert!(tool.execute(json!({}), &context).await.success);
    }
}
