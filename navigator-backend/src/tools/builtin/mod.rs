//! Built-in tools for the crew
//!
//! All three return fixed payloads that stand in for wallet analysis,
//! the Catalyst opportunity feed and Begin Wallet integration tips.

mod begin_wallet;
mod cardano_analysis;
mod catalyst_opportunity;

pub use begin_wallet::BeginWalletTool;
pub use cardano_analysis::CardanoAnalysisTool;
pub use catalyst_opportunity::CatalystOpportunityTool;

pub use begin_wallet::NAME as BEGIN_WALLET;
pub use cardano_analysis::NAME as CARDANO_ANALYSIS;
pub use catalyst_opportunity::NAME as CATALYST_OPPORTUNITY;
