//! Task executors turn an agent plus a task brief into a text result.
//!
//! `LlmExecutor` hands the brief to a `ChatModel` (the OpenAI client in
//! production) and runs the tool calls it asks for. `ScriptedExecutor` runs
//! every tool of the agent itself and renders a deterministic report,
//! which keeps the service usable without an API key.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ai::{ChatModel, Message, OpenAIClient, ToolCall, ToolHistoryEntry, ToolResponse};
use crate::config::Config;
use crate::crew::agents::AgentConfig;
use crate::crew::tasks::TaskSpec;
use crate::errors::CrewError;
use crate::tools::builtin::{BEGIN_WALLET, CARDANO_ANALYSIS, CATALYST_OPPORTUNITY};
use crate::tools::{Tool, ToolContext, ToolDefinition};

#[async_trait]
pub trait TaskExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        agent: &AgentConfig,
        task: &TaskSpec,
        tools: &[Arc<dyn Tool>],
        context: &ToolContext,
    ) -> Result<String, CrewError>;
}

/// Pick the executor for this process
pub fn executor_from_config(config: &Config) -> Result<Arc<dyn TaskExecutor>, String> {
    if !config.uses_llm() {
        if config.openai_api_key.is_some() {
            log::info!("[CREW] Offline mode requested, using scripted executor");
        } else {
            log::warn!("[CREW] OPENAI_API_KEY not set, using scripted executor");
        }
        return Ok(Arc::new(ScriptedExecutor));
    }

    let client = OpenAIClient::new(
        config.openai_api_key.as_deref().unwrap_or_default(),
        config.llm_endpoint.as_deref(),
        config.llm_model.as_deref(),
        Some(config.llm_max_tokens),
    )?;
    log::info!("[CREW] Using LLM executor with model {}", client.model());
    Ok(Arc::new(LlmExecutor::new(Arc::new(client), config.crew_max_iterations)))
}

fn find_tool<'a>(tools: &'a [Arc<dyn Tool>], name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|t| t.name() == name)
}

/// Runs the agent's tools directly and formats their output
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedExecutor;

impl ScriptedExecutor {
    /// Arguments a scripted agent passes to a tool
    fn arguments_for(tool_name: &str, context: &ToolContext) -> Value {
        let address = context.user_address.clone().unwrap_or_default();
        match tool_name {
            CARDANO_ANALYSIS => json!({ "wallet_address": address }),
            CATALYST_OPPORTUNITY => json!({ "experience_level": "intermediate" }),
            BEGIN_WALLET => {
                let mut profile = format!("Cardano wallet {}", address);
                if let Some(timeline) = &context.timeline {
                    profile.push_str(&format!(", {} plan", timeline));
                }
                json!({ "user_profile": profile })
            }
            _ => json!({}),
        }
    }
}

#[async_trait]
impl TaskExecutor for ScriptedExecutor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn execute(
        &self,
        agent: &AgentConfig,
        task: &TaskSpec,
        tools: &[Arc<dyn Tool>],
        context: &ToolContext,
    ) -> Result<String, CrewError> {
        let mut report = format!(
            "# {}\n\nGoal: {}\n\n## Task\n\n{}\n\n## Findings\n",
            agent.role, agent.goal, task.description
        );

        for tool in tools {
            let name = tool.name();
            let result = tool.execute(Self::arguments_for(&name, context), context).await;
            report.push_str(&format!("\n### {}\n\n", name));
            if result.success {
                report.push_str(&result.content);
            } else {
                log::warn!("[CREW] Tool '{}' failed: {}", name, result.content);
                report.push_str(&format!("error: {}", result.content));
            }
            report.push('\n');
        }

        report.push_str(&format!("\n## Deliverable\n\n{}\n", task.expected_output));
        Ok(report)
    }
}

/// Drives a chat model through a native tool-calling loop
pub struct LlmExecutor {
    client: Arc<dyn ChatModel>,
    max_iterations: u32,
}

impl LlmExecutor {
    /// `max_iterations` is validated as non-zero by the config layer
    pub fn new(client: Arc<dyn ChatModel>, max_iterations: u32) -> Self {
        Self {
            client,
            max_iterations,
        }
    }

    async fn execute_tool_calls(
        tool_calls: &[ToolCall],
        tools: &[Arc<dyn Tool>],
        context: &ToolContext,
    ) -> Vec<ToolResponse> {
        let mut responses = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            let response = match find_tool(tools, &call.name) {
                Some(tool) => {
                    let result = tool.execute(call.arguments.clone(), context).await;
                    if result.success {
                        ToolResponse::success(&call.id, result.content)
                    } else {
                        ToolResponse::error(&call.id, result.content)
                    }
                }
                None => ToolResponse::error(&call.id, format!("Unknown tool: {}", call.name)),
            };
            responses.push(response);
        }
        responses
    }
}

#[async_trait]
impl TaskExecutor for LlmExecutor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn execute(
        &self,
        agent: &AgentConfig,
        task: &TaskSpec,
        tools: &[Arc<dyn Tool>],
        context: &ToolContext,
    ) -> Result<String, CrewError> {
        let messages = vec![
            Message::system(agent.persona_prompt()),
            Message::user(task.prompt()),
        ];
        let definitions: Vec<ToolDefinition> = tools.iter().map(|t| t.definition()).collect();
        let mut tool_history: Vec<ToolHistoryEntry> = Vec::new();

        for iteration in 1..=self.max_iterations {
            log::debug!("[CREW] {} iteration {}", agent.role, iteration);

            let response = self
                .client
                .generate_with_tools(messages.clone(), &tool_history, &definitions)
                .await
                .map_err(CrewError::Executor)?;

            if !response.is_tool_use() {
                return Ok(response.content);
            }

            log::debug!(
                "[CREW] {} requested {} tool call(s) ({:?})",
                agent.role,
                response.tool_calls.len(),
                response.stop_reason
            );
            let tool_responses = Self::execute_tool_calls(&response.tool_calls, tools, context).await;
            tool_history.push(ToolHistoryEntry::new(response.tool_calls, tool_responses));
        }

        Err(CrewError::IterationLimit {
            agent: agent.role.clone(),
            limit: self.max_iterations,
        })
    }
}
