//! MCP moderation tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `list_pending_answers` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListPendingParams {
    /// Maximum number of entries (1-100). Defaults to 20.
    #[schemars(description = "Maximum number of entries to return (1-100). Defaults to 20.")]
    pub limit: Option<usize>,
}

/// Parameters for the `approve_answer` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApproveAnswerParams {
    #[schemars(description = "ID of the generated answer")]
    pub id: String,

    /// `false` revokes a previous approval.
    #[schemars(description = "true to approve (default), false to revoke approval")]
    pub approved: Option<bool>,
}
