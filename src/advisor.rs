//! Projection service: deterministic numbers, optional narrative, audit record.
//!
//! The projection itself never depends on the generator or the store. A failed
//! narrative or audit write is logged and reported in `warnings`, and the
//! computed figures are still returned.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::FinsageConfig;
use crate::db::{run_blocking, SharedConnection};
use crate::error::AdvisorResult;
use crate::generation::prompts::{self, PromptSettings};
use crate::generation::{GenerationError, GenerationRequest, NarrativeGenerator};
use crate::projection::audit::{self, ProjectionKind, ProjectionRecord};
use crate::projection::portfolio::{self, AssetHolding, PortfolioProjection};
use crate::projection::savings::{self, SavingsProjection, SavingsRequest};

#[derive(Debug, Clone, Serialize)]
pub struct SavingsAdvice {
    #[serde(flatten)]
    pub projection: SavingsProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAdvice {
    #[serde(flatten)]
    pub projection: PortfolioProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub struct Advisor {
    db: SharedConnection,
    generator: Arc<dyn NarrativeGenerator>,
    prompts: PromptSettings,
    timeout: Duration,
}

impl Advisor {
    pub fn new(
        db: SharedConnection,
        generator: Arc<dyn NarrativeGenerator>,
        prompts: PromptSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            db,
            generator,
            prompts,
            timeout,
        }
    }

    pub fn from_config(
        db: SharedConnection,
        generator: Arc<dyn NarrativeGenerator>,
        config: &FinsageConfig,
    ) -> Self {
        Self::new(
            db,
            generator,
            PromptSettings::from_config(&config.generation),
            Duration::from_secs(config.generation.timeout_secs),
        )
    }

    pub async fn project_savings(
        &self,
        request: SavingsRequest,
        with_narrative: bool,
    ) -> AdvisorResult<SavingsAdvice> {
        let projection = savings::project_savings(&request)?;
        tracing::info!(
            goal = request.goal_amount,
            months = request.horizon_months,
            tier = %projection.allocation_tier,
            "savings projection computed"
        );

        let mut warnings = Vec::new();
        let narrative = if with_narrative {
            let prompt = prompts::savings_request(&request, &projection, &self.prompts);
            self.narrate(&prompt, &mut warnings).await
        } else {
            None
        };

        let audit_id = self
            .record(
                ProjectionKind::Savings,
                serde_json::to_value(&request),
                serde_json::to_value(&projection),
                narrative.clone(),
                &mut warnings,
            )
            .await;

        Ok(SavingsAdvice {
            projection,
            narrative,
            audit_id,
            warnings,
        })
    }

    pub async fn project_portfolio(
        &self,
        assets: Vec<AssetHolding>,
        risk_tolerance: &str,
        with_narrative: bool,
    ) -> AdvisorResult<PortfolioAdvice> {
        let projection = portfolio::project_portfolio(&assets, risk_tolerance)?;
        tracing::info!(
            assets = assets.len(),
            risk = %projection.risk_tolerance,
            "portfolio projection computed"
        );

        let mut warnings = Vec::new();
        let narrative = if with_narrative {
            let prompt = prompts::portfolio_request(&projection, &self.prompts);
            self.narrate(&prompt, &mut warnings).await
        } else {
            None
        };

        let request = serde_json::json!({
            "assets": assets,
            "risk_tolerance": risk_tolerance,
        });
        let audit_id = self
            .record(
                ProjectionKind::Portfolio,
                Ok(request),
                serde_json::to_value(&projection),
                narrative.clone(),
                &mut warnings,
            )
            .await;

        Ok(PortfolioAdvice {
            projection,
            narrative,
            audit_id,
            warnings,
        })
    }

    pub async fn history(&self, limit: usize) -> AdvisorResult<Vec<ProjectionRecord>> {
        run_blocking(&self.db, move |conn| audit::history(conn, limit)).await
    }

    async fn narrate(&self, prompt: &GenerationRequest, warnings: &mut Vec<String>) -> Option<String> {
        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };
        match outcome.map(|text| text.trim().to_string()) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => {
                tracing::warn!("narrative generation returned empty text");
                warnings.push("narrative unavailable".to_string());
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "narrative generation failed");
                warnings.push("narrative unavailable".to_string());
                None
            }
        }
    }

    async fn record(
        &self,
        kind: ProjectionKind,
        request: serde_json::Result<serde_json::Value>,
        result: serde_json::Result<serde_json::Value>,
        narrative: Option<String>,
        warnings: &mut Vec<String>,
    ) -> Option<i64> {
        let (request, result) = match (request, result) {
            (Ok(req), Ok(res)) => (req, res),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "failed to serialize projection for audit");
                warnings.push("audit record not saved".to_string());
                return None;
            }
        };

        let stored = run_blocking(&self.db, move |conn| {
            audit::record_projection(conn, kind, &request, &result, narrative.as_deref())
        })
        .await;
        match stored {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, kind = kind.as_str(), "failed to write projection audit record");
                warnings.push("audit record not saved".to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::error::AdvisorError;
    use crate::generation::DisabledGenerator;
    use crate::projection::portfolio::AssetClass;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EchoGenerator;

    #[async_trait]
    impl NarrativeGenerator for EchoGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            Ok(format!("narrative for: {}", request.user_prompt.lines().next().unwrap_or("")))
        }
    }

    fn advisor(generator: Arc<dyn NarrativeGenerator>) -> (Advisor, SharedConnection) {
        let shared: SharedConnection = Arc::new(Mutex::new(db::open_memory_database().unwrap()));
        let advisor = Advisor::new(
            Arc::clone(&shared),
            generator,
            PromptSettings::default(),
            Duration::from_secs(5),
        );
        (advisor, shared)
    }

    #[tokio::test]
    async fn savings_without_narrative_is_audited() {
        let (advisor, _) = advisor(Arc::new(DisabledGenerator::new("off")));
        let advice = advisor
            .project_savings(SavingsRequest::new(5000.0, 10, 0.0), false)
            .await
            .unwrap();
        assert_eq!(advice.projection.monthly_contribution, 500.0);
        assert!(advice.narrative.is_none());
        assert!(advice.warnings.is_empty());
        assert!(advice.audit_id.is_some());

        let history = advisor.history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, "savings");
    }

    #[tokio::test]
    async fn narrative_failure_keeps_the_numbers() {
        let (advisor, _) = advisor(Arc::new(DisabledGenerator::new("off")));
        let advice = advisor
            .project_portfolio(vec![AssetHolding::new(AssetClass::Equity, 1000.0)], "high", true)
            .await
            .unwrap();
        assert!((advice.projection.projected_value_5y - 2488.32).abs() < 0.01);
        assert!(advice.narrative.is_none());
        assert_eq!(advice.warnings, vec!["narrative unavailable"]);
    }

    #[tokio::test]
    async fn narrative_is_attached_and_stored() {
        let (advisor, _) = advisor(Arc::new(EchoGenerator));
        let advice = advisor
            .project_savings(SavingsRequest::new(1200.0, 12, 0.06), true)
            .await
            .unwrap();
        let narrative = advice.narrative.unwrap();
        assert!(narrative.starts_with("narrative for: Savings goal"));

        let history = advisor.history(1).await.unwrap();
        assert_eq!(history[0].narrative.as_deref(), Some(narrative.as_str()));
        assert_eq!(history[0].request["horizon_months"], 12);
    }

    #[tokio::test]
    async fn audit_failure_keeps_the_numbers() {
        let (advisor, shared) = advisor(Arc::new(DisabledGenerator::new("off")));
        shared
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE projection_log")
            .unwrap();

        let advice = advisor
            .project_savings(SavingsRequest::new(100.0, 4, 0.0), false)
            .await
            .unwrap();
        assert_eq!(advice.projection.monthly_contribution, 25.0);
        assert!(advice.audit_id.is_none());
        assert_eq!(advice.warnings, vec!["audit record not saved"]);
    }

    #[tokio::test]
    async fn invalid_input_is_a_validation_error() {
        let (advisor, _) = advisor(Arc::new(EchoGenerator));
        let err = advisor
            .project_savings(SavingsRequest::new(100.0, 0, 0.05), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(ref v) if v.field == "horizon_months"));

        let err = advisor.project_portfolio(Vec::new(), "low", false).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
