//! Agent roster - the three scripted roles of the crew
//!
//! Roles are loaded from `agents.ron` in the config directory. Any role
//! missing from the file (or the whole file) falls back to the built-in
//! definition.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::tools::builtin::{BEGIN_WALLET, CARDANO_ANALYSIS, CATALYST_OPPORTUNITY};

pub const ROSTER_FILE: &str = "agents.ron";

/// Identifies one crew member
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentId {
    CareerAnalyst,
    RoadmapGenerator,
    CatalystAdvisor,
}

/// Static configuration handed to the task executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Tool names, resolved against the tool registry at execution time
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_verbose() -> bool {
    true
}

impl AgentConfig {
    fn new(role: &str, goal: &str, backstory: &str, tools: &[&str]) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
            verbose: true,
        }
    }

    /// Built-in definition for a role
    pub fn builtin(id: AgentId) -> Self {
        match id {
            AgentId::CareerAnalyst => Self::new(
                "Cardano Career Analyst",
                "Analyze user on-chain activity to determine career readiness and skills",
                "You are an expert in analyzing Cardano blockchain transactions to understand \
                 user behavior, skills, and experience levels. You specialize in identifying \
                 patterns that indicate technical proficiency and career interests.",
                &[CARDANO_ANALYSIS],
            ),
            AgentId::RoadmapGenerator => Self::new(
                "Career Roadmap Specialist",
                "Create personalized learning paths with actionable milestones",
                "You are a career guidance expert specializing in the Cardano ecosystem. You \
                 create detailed, timeline-based learning paths that help users progress from \
                 their current level to their career goals.",
                &[CATALYST_OPPORTUNITY, BEGIN_WALLET],
            ),
            AgentId::CatalystAdvisor => Self::new(
                "Project Catalyst Expert",
                "Provide specialized guidance for Catalyst proposal creation and submission",
                "You are a Project Catalyst veteran who has successfully submitted multiple \
                 funded proposals. You understand the nuances of proposal writing, community \
                 engagement, and the funding process.",
                &[CATALYST_OPPORTUNITY],
            ),
        }
    }

    /// System prompt describing who the agent is
    pub fn persona_prompt(&self) -> String {
        format!(
            "You are {}.\n\nGoal: {}\n\nBackstory: {}",
            self.role, self.goal, self.backstory
        )
    }
}

/// The configured crew members
#[derive(Debug, Clone)]
pub struct AgentRoster {
    career_analyst: AgentConfig,
    roadmap_generator: AgentConfig,
    catalyst_advisor: AgentConfig,
}

impl Default for AgentRoster {
    fn default() -> Self {
        Self {
            career_analyst: AgentConfig::builtin(AgentId::CareerAnalyst),
            roadmap_generator: AgentConfig::builtin(AgentId::RoadmapGenerator),
            catalyst_advisor: AgentConfig::builtin(AgentId::CatalystAdvisor),
        }
    }
}

impl AgentRoster {
    /// Load the roster from `<config_dir>/agents.ron`, falling back to the
    /// built-in roles when the file does not exist.
    pub fn load(config_dir: &Path) -> Result<Self, String> {
        let path = config_dir.join(ROSTER_FILE);
        if !path.exists() {
            log::warn!("[CONFIG] Agent roster not found at {:?}, using built-in roles", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
        let roster = Self::from_ron(&content).map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

        log::info!("[CONFIG] Loaded agent roster from {:?}", path);
        Ok(roster)
    }

    /// Parse a map of agent id to role definition. Unknown ids are rejected.
    pub fn from_ron(content: &str) -> Result<Self, String> {
        let entries = ron::from_str::<HashMap<String, AgentConfig>>(content).map_err(|e| e.to_string())?;

        let mut roster = Self::default();
        for (key, agent) in entries {
            let id: AgentId = key
                .parse()
                .map_err(|_| format!("Unknown agent id '{}'", key))?;
            *roster.get_mut(id) = agent;
        }
        Ok(roster)
    }

    fn get_mut(&mut self, id: AgentId) -> &mut AgentConfig {
        match id {
            AgentId::CareerAnalyst => &mut self.career_analyst,
            AgentId::RoadmapGenerator => &mut self.roadmap_generator,
            AgentId::CatalystAdvisor => &mut self.catalyst_advisor,
        }
    }

    pub fn get(&self, id: AgentId) -> &AgentConfig {
        match id {
            AgentId::CareerAnalyst => &self.career_analyst,
            AgentId::RoadmapGenerator => &self.roadmap_generator,
            AgentId::CatalystAdvisor => &self.catalyst_advisor,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &AgentConfig)> {
        AgentId::iter().map(move |id| (id, self.get(id)))
    }
}
