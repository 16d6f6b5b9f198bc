use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSavingsParams {
    #[schemars(description = "Target amount to accumulate (> 0)")]
    pub goal_amount: f64,

    #[schemars(description = "Number of monthly contributions (1-1200)")]
    pub horizon_months: i64,

    #[schemars(
        description = "Desired annual return as a fraction, 0.0-0.30 (e.g. 0.06 for 6%). Defaults to 0."
    )]
    pub desired_annual_rate: Option<f64>,

    #[schemars(description = "If true, add a short advisor narrative. Defaults to false.")]
    pub narrative: Option<bool>,
}
