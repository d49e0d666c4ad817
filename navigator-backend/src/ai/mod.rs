pub mod openai;
pub mod types;

pub use openai::OpenAIClient;
pub use types::{AiResponse, ToolCall, ToolHistoryEntry, ToolResponse};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tools::ToolDefinition;

/// A chat model that can request tool calls
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model(&self) -> &str;

    /// One completion over the conversation plus the tool rounds so far
    async fn generate_with_tools(
        &self,
        messages: Vec<Message>,
        tool_history: &[ToolHistoryEntry],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}
