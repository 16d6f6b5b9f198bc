pub mod knowledge_stats;
pub mod moderation;
pub mod project_portfolio;
pub mod project_savings;
pub mod resolve_question;

use std::sync::Arc;

use knowledge_stats::KnowledgeStatsParams;
use moderation::{ApproveAnswerParams, ListPendingParams};
use project_portfolio::ProjectPortfolioParams;
use project_savings::ProjectSavingsParams;
use resolve_question::ResolveQuestionParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;

use finsage::advisor::Advisor;
use finsage::db::{run_blocking, SharedConnection};
use finsage::error::AdvisorError;
use finsage::knowledge::pipeline::ResolutionPipeline;
use finsage::projection::portfolio::{AssetClass, AssetHolding};
use finsage::projection::savings::SavingsRequest;

const DEFAULT_PENDING_LIMIT: usize = 20;
const MAX_PENDING_LIMIT: usize = 100;

/// The finsage MCP tool handler. Holds the shared pipeline, advisor and
/// database handle, and exposes all tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct FinsageTools {
    tool_router: ToolRouter<Self>,
    db: SharedConnection,
    pipeline: Arc<ResolutionPipeline>,
    advisor: Arc<Advisor>,
}

fn tool_error(err: AdvisorError) -> String {
    if !err.is_client_error() {
        tracing::error!(error = ?err, "tool call failed");
    }
    err.to_string()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

#[tool_router]
impl FinsageTools {
    pub fn new(db: SharedConnection, pipeline: Arc<ResolutionPipeline>, advisor: Arc<Advisor>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            pipeline,
            advisor,
        }
    }

    /// Answer a financial question from curated, approved, or newly generated knowledge.
    #[tool(description = "Answer a personal finance question. Checks curated FAQ answers first, then previously approved AI answers, and only then generates a new answer (marked pending approval).")]
    async fn resolve_question(
        &self,
        Parameters(params): Parameters<ResolveQuestionParams>,
    ) -> Result<String, String> {
        tracing::info!(question_len = params.question.len(), "resolve_question called");

        let resolution = self
            .pipeline
            .resolve(&params.question, params.asked_by.as_deref())
            .await
            .map_err(tool_error)?;

        let mut body = serde_json::to_value(&resolution)
            .map_err(|e| format!("serialization failed: {e}"))?;
        if let (Some(note), Some(obj)) = (resolution.moderation_note(), body.as_object_mut()) {
            obj.insert("note".into(), note.into());
        }
        Ok(body.to_string())
    }

    /// Compute the level monthly contribution for a savings goal.
    #[tool(description = "Compute the monthly contribution needed to reach a savings goal, with a recommended allocation tier and month-by-month schedule.")]
    async fn project_savings(
        &self,
        Parameters(params): Parameters<ProjectSavingsParams>,
    ) -> Result<String, String> {
        let request = SavingsRequest::new(
            params.goal_amount,
            params.horizon_months,
            params.desired_annual_rate.unwrap_or(0.0),
        );
        tracing::info!(months = request.horizon_months, "project_savings called");

        let advice = self
            .advisor
            .project_savings(request, params.narrative.unwrap_or(false))
            .await
            .map_err(tool_error)?;
        to_json(&advice)
    }

    /// Project holdings five years ahead at fixed per-class growth rates.
    #[tool(description = "Project a portfolio of holdings five years ahead using fixed annual growth rates per asset class, with a recommended allocation tier for the given risk tolerance.")]
    async fn project_portfolio(
        &self,
        Parameters(params): Parameters<ProjectPortfolioParams>,
    ) -> Result<String, String> {
        let assets = params
            .assets
            .iter()
            .map(|h| {
                h.asset_class
                    .parse::<AssetClass>()
                    .map(|class| AssetHolding::new(class, h.current_value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| tool_error(e.into()))?;
        tracing::info!(assets = assets.len(), "project_portfolio called");

        let advice = self
            .advisor
            .project_portfolio(assets, &params.risk_tolerance, params.narrative.unwrap_or(false))
            .await
            .map_err(tool_error)?;
        to_json(&advice)
    }

    /// List generated answers awaiting moderation.
    #[tool(description = "List AI-generated answers that are waiting for moderator approval, oldest first.")]
    async fn list_pending_answers(
        &self,
        Parameters(params): Parameters<ListPendingParams>,
    ) -> Result<String, String> {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_PENDING_LIMIT)
            .clamp(1, MAX_PENDING_LIMIT);
        let pending = self.pipeline.list_pending(limit).await.map_err(tool_error)?;
        to_json(&serde_json::json!({
            "pending": pending,
            "count": pending.len(),
        }))
    }

    /// Approve or revoke a generated answer.
    #[tool(description = "Approve a pending AI-generated answer so it can answer future questions, or revoke a previous approval with approved=false.")]
    async fn approve_answer(
        &self,
        Parameters(params): Parameters<ApproveAnswerParams>,
    ) -> Result<String, String> {
        let entry = if params.approved.unwrap_or(true) {
            self.pipeline.approve(&params.id).await
        } else {
            self.pipeline.revoke(&params.id).await
        }
        .map_err(tool_error)?;
        to_json(&entry)
    }

    /// Counts across the knowledge stores and the projection audit trail.
    #[tool(description = "Get knowledge base statistics: curated entries, approved and pending AI answers, projection records.")]
    async fn knowledge_stats(
        &self,
        Parameters(_params): Parameters<KnowledgeStatsParams>,
    ) -> Result<String, String> {
        let stats = run_blocking(&self.db, |conn| finsage::knowledge::stats::knowledge_stats(conn))
            .await
            .map_err(tool_error)?;
        to_json(&stats)
    }
}

#[tool_handler]
impl ServerHandler for FinsageTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "finsage is a personal finance advisor. Use resolve_question for finance \
                 questions, project_savings and project_portfolio for projections, and \
                 list_pending_answers / approve_answer to moderate AI answers."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
