//! Begin Wallet integration tips (progress tracking and eSIM rewards)

use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const NAME: &str = "begin_wallet_tool";

pub struct BeginWalletTool {
    definition: ToolDefinition,
}

impl BeginWalletTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "user_profile".to_string(),
            PropertySchema::string("Summary of the user's skills, interests and goals"),
        );

        BeginWalletTool {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Generates Begin Wallet specific integration tips and eSIM rewards".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["user_profile".to_string()],
                },
            },
        }
    }

    fn tips() -> Value {
        json!([
            {
                "category": "progress-tracking",
                "title": "Track Learning On-Chain",
                "description": "Use Begin Wallet metadata to store milestone achievements",
                "benefit": "Verifiable proof of learning progress"
            },
            {
                "category": "esim-rewards",
                "title": "Earn Data Rewards",
                "description": "Complete milestones to earn mobile data through Begin Wallet",
                "benefit": "Real-world utility from learning achievements"
            }
        ])
    }
}

impl Default for BeginWalletTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for BeginWalletTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        if !params.is_object() && !params.is_null() {
            return ToolResult::error("Invalid parameters: expected an object");
        }

        log::info!(
            "[{}] Generating tips (job: {})",
            NAME,
            context.job_id.as_deref().unwrap_or("-")
        );
        ToolResult::json(&Self::tips())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_two_tips() {
        let tool = BeginWalletTool::new();
        let result = tool
            .execute(json!({"user_profile": "intermediate developer"}), &ToolContext::new())
            .await;
        assert!(result.success);
        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        let categories: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["category"].as_str().unwrap())
            .collect();
        assert_eq!(categories, vec!["progress-tracking", "esim-rewards"]);
    }

    #[tokio::test]
    async fn test_rejects_non_object_params() {
        let tool = BeginWalletTool::new();
        assert!(!tool.execute(json!("profile"), &ToolContext::new()).await.success);
    }
}
