use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The `knowledge_stats` tool takes no arguments.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeStatsParams {}
