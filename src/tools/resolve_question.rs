//! MCP `resolve_question` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `resolve_question` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResolveQuestionParams {
    /// Free-text financial question.
    #[schemars(description = "The user's financial question, in any language")]
    pub question: String,

    /// Who asked. Stored with any generated answer for moderation context.
    #[schemars(description = "Optional identifier of the user asking the question")]
    pub asked_by: Option<String>,
}
