pub mod agents;
pub mod executor;
pub mod tasks;

pub use agents::{AgentConfig, AgentRoster};
pub use executor::{executor_from_config, TaskExecutor};
pub use tasks::TaskSpec;

use log::Level;
use std::sync::Arc;

use crate::errors::CrewError;
use crate::models::{ServiceResult, ServiceType, DEFAULT_ROADMAP_TIMELINE};
use crate::tools::{Tool, ToolContext, ToolRegistry};

/// The career navigator crew: roster, tools and the engine that runs them
pub struct Crew {
    roster: AgentRoster,
    registry: Arc<ToolRegistry>,
    executor: Arc<dyn TaskExecutor>,
    agent_id: String,
}

impl Crew {
    pub fn new(
        roster: AgentRoster,
        registry: Arc<ToolRegistry>,
        executor: Arc<dyn TaskExecutor>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            roster,
            registry,
            executor,
            agent_id: agent_id.into(),
        }
    }

    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Check that every agent only references registered tools
    pub fn validate(&self) -> Result<(), CrewError> {
        for (_, agent) in self.roster.iter() {
            self.resolve_tools(agent)?;
        }
        Ok(())
    }

    fn resolve_tools(&self, agent: &AgentConfig) -> Result<Vec<Arc<dyn Tool>>, CrewError> {
        agent
            .tools
            .iter()
            .map(|name| {
                self.registry.get(name).ok_or_else(|| CrewError::UnknownTool {
                    agent: agent.role.clone(),
                    tool: name.clone(),
                })
            })
            .collect()
    }

    pub async fn process_request(
        &self,
        service_type: ServiceType,
        user_address: &str,
        timeline: Option<String>,
    ) -> Result<ServiceResult, CrewError> {
        self.run(service_type, user_address, timeline, ToolContext::new())
            .await
    }

    /// Same as `process_request`, with the job id threaded into tool context
    pub async fn process_job(
        &self,
        job_id: &str,
        service_type: ServiceType,
        user_address: &str,
        timeline: Option<String>,
    ) -> Result<ServiceResult, CrewError> {
        self.run(
            service_type,
            user_address,
            timeline,
            ToolContext::new().with_job(job_id),
        )
        .await
    }

    async fn run(
        &self,
        service_type: ServiceType,
        user_address: &str,
        timeline: Option<String>,
        context: ToolContext,
    ) -> Result<ServiceResult, CrewError> {
        let timeline = match service_type {
            ServiceType::Roadmap => timeline.or_else(|| Some(DEFAULT_ROADMAP_TIMELINE.to_string())),
            _ => timeline,
        };

        let task = TaskSpec::for_service(service_type, user_address, timeline.as_deref());
        let agent = self.roster.get(task.agent);
        let tools = self.resolve_tools(agent)?;
        let context = context
            .with_user_address(user_address)
            .with_timeline(timeline.clone());

        let level = if agent.verbose { Level::Info } else { Level::Debug };
        log::log!(
            level,
            "[CREW] {} handling {} for {} ({} tools, {} executor)",
            agent.role,
            service_type,
            user_address,
            tools.len(),
            self.executor.name()
        );

        let output = self.executor.execute(agent, &task, &tools, &context).await?;

        log::log!(level, "[CREW] {} finished {} ({} chars)", agent.role, service_type, output.len());

        Ok(ServiceResult::new(
            service_type,
            user_address,
            timeline,
            output,
            self.agent_id.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_AGENT_ID;
    use crate::crew::executor::ScriptedExecutor;
    use crate::tools::create_default_registry;

    fn scripted_crew(roster: AgentRoster) -> Crew {
        Crew::new(
            roster,
            Arc::new(create_default_registry()),
            Arc::new(ScriptedExecutor),
            DEFAULT_AGENT_ID,
        )
    }

    #[tokio::test]
    async fn test_assessment_result() {
        let crew = scripted_crew(AgentRoster::default());
        let result = crew
            .process_request(ServiceType::Assessment, "addr_test1abc", None)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.service, ServiceType::Assessment);
        assert_eq!(result.user_address, "addr_test1abc");
        assert_eq!(result.timeline, None);
        assert_eq!(result.agent_id, DEFAULT_AGENT_ID);
        assert!(result.result.contains("Cardano Career Analyst"));
    }

    #[tokio::test]
    async fn test_roadmap_defaults_timeline() {
        let crew = scripted_crew(AgentRoster::default());
        let result = crew
            .process_request(ServiceType::Roadmap, "addr_test1abc", None)
            .await
            .unwrap();
        assert_eq!(result.timeline.as_deref(), Some("6-months"));
        assert!(result.result.contains("6-months career roadmap"));
    }

    #[tokio::test]
    async fn test_catalyst_uses_advisor() {
        let crew = scripted_crew(AgentRoster::default());
        let result = crew
            .process_job("job-1", ServiceType::Catalyst, "addr_test1abc", None)
            .await
            .unwrap();
        assert!(result.result.starts_with("# Project Catalyst Expert"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails() {
        let roster = AgentRoster::from_ron(
            r#"{"career_analyst": (
                role: "Analyst",
                goal: "g",
                backstory: "b",
                tools: ["chain_indexer_tool"],
            )}"#,
        )
        .unwrap();
        let crew = scripted_crew(roster);

        assert!(matches!(crew.validate(), Err(CrewError::UnknownTool { .. })));
        let err = crew
            .process_request(ServiceType::Assessment, "addr1", None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CrewError::UnknownTool {
                agent: "Analyst".to_string(),
                tool: "chain_indexer_tool".to_string(),
            }
        );
    }

    #[test]
    fn test_default_roster_validates() {
        let crew = scripted_crew(AgentRoster::default());
        assert!(crew.validate().is_ok());
        assert_eq!(crew.executor_name(), "scripted");
    }
}
