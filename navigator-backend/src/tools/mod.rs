pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::{Tool, ToolRegistry};
pub use types::{ToolContext, ToolDefinition};

use std::sync::Arc;

/// Register all built-in tools to a registry
fn register_all_tools(registry: &mut ToolRegistry) {
    // Wallet analysis (career analyst)
    registry.register(Arc::new(builtin::CardanoAnalysisTool::new()));

    // Funding and ecosystem lookups (roadmap generator, catalyst advisor)
    registry.register(Arc::new(builtin::CatalystOpportunityTool::new()));
    registry.register(Arc::new(builtin::BeginWalletTool::new()));
}

/// Create a new ToolRegistry with all built-in tools registered
pub fn create_default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_all_tools(&mut registry);
    registry
}
