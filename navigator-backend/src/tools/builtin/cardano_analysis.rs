//! Cardano wallet analysis tool
//!
//! Turns a wallet address into skill and experience signals. The payload is
//! a fixed sample profile until a chain indexer is wired in.

use crate::tools::registry::Tool;
use crate::tools::types::{PropertySchema, ToolContext, ToolDefinition, ToolInputSchema, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const NAME: &str = "cardano_analysis_tool";

pub struct CardanoAnalysisTool {
    definition: ToolDefinition,
}

impl CardanoAnalysisTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "wallet_address".to_string(),
            PropertySchema::string("Cardano wallet address to analyze (addr1... or addr_test1...)"),
        );

        CardanoAnalysisTool {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Analyzes Cardano wallet transactions to determine user skills and experience".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["wallet_address".to_string()],
                },
            },
        }
    }

    fn analysis() -> Value {
        json!({
            "experience_level": "intermediate",
            "transaction_count": 45,
            "technical_skills": ["staking", "defi", "nft-trading", "begin-wallet"],
            "interests": ["real-world-utility", "travel", "governance"],
            "preferred_path": "development",
            "learning_style": "hands-on"
        })
    }
}

impl Default for CardanoAnalysisTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CardanoAnalysisParams {
    wallet_address: Option<String>,
}

#[async_trait]
impl Tool for CardanoAnalysisTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: CardanoAnalysisParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let address = match params
            .wallet_address
            .filter(|a| !a.trim().is_empty())
            .or_else(|| context.user_address.clone())
        {
            Some(a) => a,
            None => return ToolResult::error("wallet_address is required"),
        };

        log::info!("[{}] Analyzing wallet {}", NAME, address);
        ToolResult::json(&Self::analysis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_profile() {
        let tool = CardanoAnalysisTool::new();
        let result = tool
            .execute(json!({"wallet_address": "addr_test1xyz"}), &ToolContext::new())
            .await;
        assert!(result.success);
        let parsed: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(parsed["experience_level"], "intermediate");
        assert_eq!(parsed["transaction_count"], 45);
        assert_eq!(parsed["technical_skills"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_falls_back_to_context_address() {
        let tool = CardanoAnalysisTool::new();
        let context = ToolContext::new().with_user_address("addr1abc");
        assert!(tool.execute(json!({}), &context).await.success);
    }

    #[tokio::test]
    async fn test_requires_address() {
        let tool = CardanoAnalysisTool::new();
        let result = tool.execute(json!({"wallet_address": " "}), &ToolContext::new()).await;
        assert!(!result.success);
    }
}
