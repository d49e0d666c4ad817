use crate::crew::agents::AgentId;
use crate::models::{ServiceType, DEFAULT_ROADMAP_TIMELINE};

/// One unit of work handed to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    pub agent: AgentId,
}

impl TaskSpec {
    /// Build the task brief for a service request.
    ///
    /// Roadmaps without a timeline use the default timeline.
    pub fn for_service(service: ServiceType, user_address: &str, timeline: Option<&str>) -> Self {
        match service {
            ServiceType::Assessment => Self::assessment(user_address),
            ServiceType::Roadmap => {
                Self::roadmap(user_address, timeline.unwrap_or(DEFAULT_ROADMAP_TIMELINE))
            }
            ServiceType::Catalyst => Self::catalyst(user_address),
        }
    }

    pub fn assessment(user_address: &str) -> Self {
        Self {
            description: format!(
                "Analyze the Cardano wallet address {user_address} to provide a comprehensive \
                 skills assessment. Include:\n\
                 1. Experience level determination (beginner/intermediate/advanced)\n\
                 2. Technical skills identification from transaction patterns\n\
                 3. Interest areas based on on-chain activity\n\
                 4. Preferred career path recommendation\n\
                 5. Begin Wallet integration opportunities\n\
                 6. Next steps recommendations\n\n\
                 Provide actionable insights that help the user understand their current \
                 position in the Cardano ecosystem and potential career directions."
            ),
            expected_output: "Detailed JSON assessment with experience level, skills, interests, \
                              and recommendations"
                .to_string(),
            agent: AgentId::CareerAnalyst,
        }
    }

    pub fn roadmap(user_address: &str, timeline: &str) -> Self {
        Self {
            description: format!(
                "Generate a comprehensive {timeline} career roadmap for wallet {user_address}.\n\
                 Include:\n\
                 1. Timeline-based milestones with specific deadlines\n\
                 2. Learning resources specific to Cardano ecosystem\n\
                 3. Current Project Catalyst opportunities\n\
                 4. Begin Wallet integration tips for progress tracking\n\
                 5. Achievement NFT opportunities\n\
                 6. eSIM reward integration where applicable\n\
                 7. Verification methods for each milestone\n\n\
                 Create a practical, actionable plan that guides the user step-by-step \
                 toward their career goals in the Cardano ecosystem."
            ),
            expected_output: "Detailed roadmap with milestones, resources, opportunities, and \
                              Begin Wallet integration"
                .to_string(),
            agent: AgentId::RoadmapGenerator,
        }
    }

    pub fn catalyst(user_address: &str) -> Self {
        Self {
            description: format!(
                "Provide specialized Project Catalyst guidance for wallet {user_address}.\n\
                 Include:\n\
                 1. Readiness assessment for Catalyst participation\n\
                 2. Current funding rounds and relevant categories\n\
                 3. Proposal structure and key components\n\
                 4. Budget planning and timeline recommendations\n\
                 5. Community engagement strategies\n\
                 6. Begin Wallet integration for proposal tracking\n\
                 7. Submission timeline and deadlines\n\n\
                 Focus on practical, actionable advice that increases the likelihood \
                 of successful proposal submission and funding."
            ),
            expected_output: "Comprehensive Catalyst guidance with proposal strategy and current \
                              opportunities"
                .to_string(),
            agent: AgentId::CatalystAdvisor,
        }
    }

    /// User prompt combining the brief and the expected output
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nExpected output: {}",
            self.description, self.expected_output
        )
    }
}
