//! Prompt construction for fallback answers and projection narratives.
//!
//! Narrative prompts carry the engine's computed figures verbatim and tell the
//! model not to recompute them.

use std::fmt::Write as _;

use super::GenerationRequest;
use crate::config::GenerationConfig;
use crate::projection::portfolio::PortfolioProjection;
use crate::projection::savings::{SavingsProjection, SavingsRequest};

const SAVINGS_PERSONA: &str = "Cộng sự Tích lũy";
const INVESTMENT_PERSONA: &str = "Cộng sự Đầu tư";

/// Language and sampling knobs shared by every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSettings {
    pub language: String,
    pub faq_max_tokens: u32,
    pub narrative_max_tokens: u32,
    pub temperature: f32,
}

impl PromptSettings {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            language: config.language.clone(),
            faq_max_tokens: config.faq_max_tokens,
            narrative_max_tokens: config.narrative_max_tokens,
            temperature: config.temperature,
        }
    }

    fn language_name(&self) -> &str {
        match self.language.as_str() {
            "vi" => "Vietnamese",
            "en" => "English",
            other => other,
        }
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

/// Fallback answer for a question no stored answer covers. The question is
/// passed through as-is; no stored knowledge is added to the prompt.
pub fn faq_request(question: &str, settings: &PromptSettings) -> GenerationRequest {
    GenerationRequest {
        system_prompt: format!(
            "You are a personal finance assistant. Answer the user's question concisely \
             and accurately. Reply in {}.",
            settings.language_name()
        ),
        user_prompt: question.to_string(),
        max_tokens: settings.faq_max_tokens,
        temperature: settings.temperature,
    }
}

pub fn savings_request(
    request: &SavingsRequest,
    projection: &SavingsProjection,
    settings: &PromptSettings,
) -> GenerationRequest {
    let system_prompt = format!(
        "You are '{SAVINGS_PERSONA}', a friendly savings advisor. The plan figures below \
         are already computed; use them exactly and do not recalculate them. Explain the \
         monthly saving plan briefly and add one or two motivational tips. Reply in {}.",
        settings.language_name()
    );

    let allocation = projection.allocation;
    let mut user_prompt = format!(
        "Savings goal: {:.2} in {} months.\n",
        request.goal_amount, request.horizon_months
    );
    let _ = writeln!(
        user_prompt,
        "Desired annual return: {:.2}%",
        request.desired_annual_rate * 100.0
    );
    let _ = writeln!(
        user_prompt,
        "Required monthly contribution: {:.2}",
        projection.monthly_contribution
    );
    let _ = writeln!(
        user_prompt,
        "Recommended allocation ({}): {}% fixed deposits, {}% equity",
        projection.allocation_tier, allocation.fixed_deposit_pct, allocation.equity_pct
    );

    GenerationRequest {
        system_prompt,
        user_prompt,
        max_tokens: settings.narrative_max_tokens,
        temperature: settings.temperature,
    }
}

pub fn portfolio_request(
    projection: &PortfolioProjection,
    settings: &PromptSettings,
) -> GenerationRequest {
    let system_prompt = format!(
        "You are '{INVESTMENT_PERSONA}', a friendly investment advisor. The projection \
         figures below are already computed; use them exactly and do not recalculate them. \
         Give a concise, actionable outline for the recommended allocation with a short \
         rationale. Reply in {}.",
        settings.language_name()
    );

    let mut user_prompt = format!(
        "Risk tolerance: {} (recommended allocation: {})\nHoldings:\n",
        projection.risk_tolerance, projection.recommended_tier
    );
    for asset in &projection.per_asset_series {
        let _ = writeln!(
            user_prompt,
            "- {}: {:.2} now, {:.0}% per year, {:.2} after 5 years",
            asset.asset_class,
            asset.current_value,
            asset.annual_growth_rate * 100.0,
            asset.value_at_horizon()
        );
    }
    let _ = writeln!(
        user_prompt,
        "Total: {:.2} now, {:.2} projected after 5 years",
        projection.total_current_value, projection.projected_value_5y
    );

    GenerationRequest {
        system_prompt,
        user_prompt,
        max_tokens: settings.narrative_max_tokens,
        temperature: settings.temperature,
    }
}
