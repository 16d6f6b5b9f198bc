//! MCP `project_portfolio` tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One holding as sent by the client. The class label is parsed by the tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HoldingParam {
    #[schemars(
        description = "Asset class: EQUITY, REAL_ESTATE, PRECIOUS_METAL or FIXED_DEPOSIT (aliases: stock, gold, bank_deposit)"
    )]
    pub asset_class: String,

    #[schemars(description = "Current value of the holding (> 0)")]
    pub current_value: f64,
}

/// Parameters for the `project_portfolio` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectPortfolioParams {
    #[schemars(description = "Non-empty list of holdings")]
    pub assets: Vec<HoldingParam>,

    #[schemars(description = "Risk tolerance: low, medium or high")]
    pub risk_tolerance: String,

    #[schemars(description = "If true, add a short advisor narrative. Defaults to false.")]
    pub narrative: Option<bool>,
}
