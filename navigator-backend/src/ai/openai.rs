use crate::ai::types::{AiResponse, ToolCall, ToolHistoryEntry, ToolResponse};
use crate::ai::{ChatModel, Message};
use async_trait::async_trait;
use crate::tools::ToolDefinition;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAICompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIClient {
    pub fn new(
        api_key: &str,
        endpoint: Option<&str>,
        model: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<Self, String> {
        let endpoint_url = endpoint
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // Only add auth header if API key is provided and not empty
        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        let model_name = match model {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_MODEL.to_string(),
        };

        Ok(Self {
            client,
            endpoint: endpoint_url,
            model: model_name,
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_with_tools(
        &self,
        messages: Vec<Message>,
        tool_history: &[ToolHistoryEntry],
        tools: &[ToolDefinition],
    ) -> Result<AiResponse, String> {
        // Convert messages to OpenAI format
        let mut api_messages: Vec<OpenAIMessage> = messages
            .into_iter()
            .map(|m| OpenAIMessage {
                role: m.role.to_string(),
                content: Some(m.content),
                tool_calls: None,
                tool_call_id: None,
            })
            .collect();

        // Add tool history messages (previous tool calls and results)
        for entry in tool_history {
            api_messages.extend(Self::build_tool_result_messages(
                &entry.tool_calls,
                &entry.tool_responses,
            ));
        }

        let openai_tools: Option<Vec<OpenAITool>> = if tools.is_empty() {
            None
        } else {
            Some(tools.iter().map(Self::to_openai_tool).collect())
        };

        let request = OpenAICompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            max_tokens: self.max_tokens,
            tool_choice: openai_tools.as_ref().map(|_| "auto".to_string()),
            tools: openai_tools,
        };

        log::info!(
            "[OPENAI] Sending request to {} with model {} and {} tools",
            self.endpoint,
            self.model,
            tools.len()
        );
        log::debug!(
            "[OPENAI] Full request:\n{}",
            serde_json::to_string_pretty(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("OpenAI API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                return Err(format!("OpenAI API error: {}", error_response.error.message));
            }

            return Err(format!(
                "OpenAI API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read OpenAI response: {}", e))?;

        log::debug!("[OPENAI] Raw response:\n{}", response_text);

        Self::parse_completion(&response_text)
    }
}

impl OpenAIClient {
    fn to_openai_tool(tool: &ToolDefinition) -> OpenAITool {
        let properties: serde_json::Map<String, Value> = tool
            .input_schema
            .properties
            .iter()
            .map(|(name, prop)| {
                let mut schema = json!({
                    "type": prop.schema_type,
                    "description": prop.description
                });
                if let Some(ref values) = prop.enum_values {
                    schema["enum"] = json!(values);
                }
                if let Some(ref default) = prop.default {
                    schema["default"] = default.clone();
                }
                (name.clone(), schema)
            })
            .collect();

        OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: json!({
                    "type": tool.input_schema.schema_type,
                    "properties": properties,
                    "required": tool.input_schema.required
                }),
            },
        }
    }

    fn parse_completion(response_text: &str) -> Result<AiResponse, String> {
        let response_data: OpenAICompletionResponse = serde_json::from_str(response_text)
            .map_err(|e| format!("Failed to parse OpenAI response: {} - body: {}", e, response_text))?;

        let choice = response_data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "OpenAI API returned no choices".to_string())?;

        log::info!(
            "[OPENAI] Response - content_len: {}, tool_calls: {}, finish_reason: {:?}",
            choice.message.content.as_ref().map(|c| c.len()).unwrap_or(0),
            choice.message.tool_calls.as_ref().map(|t| t.len()).unwrap_or(0),
            choice.finish_reason
        );

        // Malformed argument strings become an empty object; the tool reports the missing fields
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                arguments: serde_json::from_str(&tc.function.arguments).unwrap_or(json!({})),
                id: tc.id,
                name: tc.function.name,
            })
            .collect();

        let is_tool_use =
            choice.finish_reason.as_deref() == Some("tool_calls") || !tool_calls.is_empty();

        Ok(AiResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            stop_reason: Some(if is_tool_use { "tool_use" } else { "end_turn" }.to_string()),
        })
    }

    /// Build tool result messages for continuing after tool execution
    pub fn build_tool_result_messages(
        tool_calls: &[ToolCall],
        tool_responses: &[ToolResponse],
    ) -> Vec<OpenAIMessage> {
        let mut messages = Vec::with_capacity(tool_responses.len() + 1);

        let openai_tool_calls: Vec<OpenAIToolCall> = tool_calls
            .iter()
            .map(|tc| OpenAIToolCall {
                id: tc.id.clone(),
                call_type: "function".to_string(),
                function: OpenAIFunctionCall {
                    name: tc.name.clone(),
                    arguments: serde_json::to_string(&tc.arguments).unwrap_or_default(),
                },
            })
            .collect();

        messages.push(OpenAIMessage {
            role: "assistant".to_string(),
            content: Some(String::new()),
            tool_calls: Some(openai_tool_calls),
            tool_call_id: None,
        });

        for response in tool_responses {
            let content = if response.is_error {
                format!("Error: {}", response.content)
            } else {
                response.content.clone()
            };
            messages.push(OpenAIMessage {
                role: "tool".to_string(),
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(response.tool_call_id.clone()),
            });
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::create_default_registry;

    #[test]
    fn test_defaults() {
        let client = OpenAIClient::new("", None, None, None).unwrap();
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_parse_text_completion() {
        let body = r#"{"choices":[{"message":{"content":"Your roadmap"},"finish_reason":"stop"}]}"#;
        let response = OpenAIClient::parse_completion(body).unwrap();
        assert_eq!(response.content, "Your roadmap");
        assert!(!response.is_tool_use());
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_parse_tool_call_completion() {
        let body = r#"{"choices":[{"message":{"content":null,"tool_calls":[
            {"id":"call_1","type":"function","function":{"name":"cardano_analysis_tool","arguments":"{\"wallet_address\":\"addr1\"}"}},
            {"id":"call_2","type":"function","function":{"name":"begin_wallet_tool","arguments":"not json"}}
        ]},"finish_reason":"tool_calls"}]}"#;
        let response = OpenAIClient::parse_completion(body).unwrap();
        assert!(response.is_tool_use());
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].arguments["wallet_address"], "addr1");
        assert_eq!(response.tool_calls[1].arguments, json!({}));
    }

    #[test]
    fn test_parse_rejects_empty_choices() {
        assert!(OpenAIClient::parse_completion(r#"{"choices":[]}"#).is_err());
        assert!(OpenAIClient::parse_completion("<html>").is_err());
    }

    #[test]
    fn test_tool_schema_conversion() {
        let registry = create_default_registry();
        let definition = registry.get("catalyst_opportunity_tool").unwrap().definition();
        let tool = OpenAIClient::to_openai_tool(&definition);
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["parameters"]["type"], "object");
        assert_eq!(
            value["function"]["parameters"]["properties"]["experience_level"]["enum"][2],
            "advanced"
        );
        assert_eq!(
            value["function"]["parameters"]["properties"]["experience_level"]["default"],
            "intermediate"
        );
        assert!(value["function"]["parameters"]["properties"]["user_skills"]
            .get("default")
            .is_none());
    }

    #[test]
    fn test_tool_result_messages() {
        let calls = vec![ToolCall {
            id: "call_1".to_string(),
            name: "begin_wallet_tool".to_string(),
            arguments: json!({"user_profile": "dev"}),
        }];
        let responses = vec![ToolResponse::success("call_1", "[]")];
        let messages = OpenAIClient::build_tool_result_messages(&calls, &responses);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "assistant");
        assert_eq!(messages[1].role, "tool");
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(messages[1].content.as_deref(), Some("[]"));

        let failed = vec![ToolResponse::error("call_1", "bad address")];
        let messages = OpenAIClient::build_tool_result_messages(&calls, &failed);
        assert_eq!(messages[1].content.as_deref(), Some("Error: bad address"));
    }
}
