//! Five-year portfolio growth projection.
//!
//! Each holding compounds annually at the fixed rate for its asset class:
//! `value(y) = current_value * (1 + rate)^y` for `y = 0..=5`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AllocationTier;
use crate::error::ValidationError;

/// Projection horizon in years.
pub const HORIZON_YEARS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Equity,
    RealEstate,
    PreciousMetal,
    FixedDeposit,
}

impl AssetClass {
    /// Fixed annual growth rate for the class. Not configurable.
    pub fn annual_growth_rate(&self) -> f64 {
        match self {
            Self::Equity => 0.20,
            Self::RealEstate => 0.12,
            Self::PreciousMetal => 0.03,
            Self::FixedDeposit => 0.05,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "EQUITY",
            Self::RealEstate => "REAL_ESTATE",
            Self::PreciousMetal => "PRECIOUS_METAL",
            Self::FixedDeposit => "FIXED_DEPOSIT",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    /// Accepts canonical names plus the legacy labels `stock`, `gold` and
    /// `bank_deposit`. Case, dashes and spaces are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "equity" | "stock" | "stocks" => Ok(Self::Equity),
            "real_estate" | "realestate" => Ok(Self::RealEstate),
            "precious_metal" | "gold" => Ok(Self::PreciousMetal),
            "fixed_deposit" | "bank_deposit" | "deposit" => Ok(Self::FixedDeposit),
            _ => Err(ValidationError::new(
                "asset_class",
                format!(
                    "must be one of EQUITY, REAL_ESTATE, PRECIOUS_METAL, FIXED_DEPOSIT (got '{}')",
                    s.trim()
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub fn recommended_tier(&self) -> AllocationTier {
        match self {
            Self::Low => AllocationTier::Conservative,
            Self::Medium => AllocationTier::Balanced,
            Self::High => AllocationTier::Aggressive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "low" | "thấp" => Ok(Self::Low),
            "medium" | "moderate" | "trung bình" => Ok(Self::Medium),
            "high" | "cao" => Ok(Self::High),
            _ => Err(ValidationError::new(
                "risk_tolerance",
                format!("must be one of LOW, MEDIUM, HIGH (got '{}')", s.trim()),
            )),
        }
    }
}

/// One holding as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHolding {
    pub asset_class: AssetClass,
    pub current_value: f64,
}

impl AssetHolding {
    pub fn new(asset_class: AssetClass, current_value: f64) -> Self {
        Self {
            asset_class,
            current_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetProjection {
    pub asset_class: AssetClass,
    pub current_value: f64,
    pub annual_growth_rate: f64,
    /// Values for years `0..=5`; year 0 equals `current_value`.
    pub series: Vec<YearValue>,
}

impl AssetProjection {
    pub fn value_at_horizon(&self) -> f64 {
        self.series.last().map(|y| y.value).unwrap_or(self.current_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioProjection {
    pub risk_tolerance: RiskTolerance,
    pub recommended_tier: AllocationTier,
    pub total_current_value: f64,
    pub projected_value_5y: f64,
    pub per_asset_series: Vec<AssetProjection>,
}

fn project_asset(holding: &AssetHolding) -> AssetProjection {
    let rate = holding.asset_class.annual_growth_rate();
    let series = (0..=HORIZON_YEARS)
        .map(|year| YearValue {
            year,
            value: holding.current_value * (1.0 + rate).powi(year as i32),
        })
        .collect();
    AssetProjection {
        asset_class: holding.asset_class,
        current_value: holding.current_value,
        annual_growth_rate: rate,
        series,
    }
}

/// Validate the holdings and risk label, then project every holding.
pub fn project_portfolio(
    assets: &[AssetHolding],
    risk_tolerance: &str,
) -> Result<PortfolioProjection, ValidationError> {
    if assets.is_empty() {
        return Err(ValidationError::new("assets", "must not be empty"));
    }
    if let Some(bad) = assets
        .iter()
        .find(|a| !a.current_value.is_finite() || a.current_value <= 0.0)
    {
        return Err(ValidationError::new(
            "current_value",
            format!("must be greater than 0 (got {} for {})", bad.current_value, bad.asset_class),
        ));
    }
    let risk: RiskTolerance = risk_tolerance.parse()?;

    let per_asset_series: Vec<AssetProjection> = assets.iter().map(project_asset).collect();

    Ok(PortfolioProjection {
        risk_tolerance: risk,
        recommended_tier: risk.recommended_tier(),
        total_current_value: assets.iter().map(|a| a.current_value).sum(),
        projected_value_5y: per_asset_series.iter().map(AssetProjection::value_at_horizon).sum(),
        per_asset_series,
    })
}
