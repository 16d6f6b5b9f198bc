//! Savings goal projection.
//!
//! The annual rate is converted to an effective monthly rate
//! `m = (1 + r)^(1/12) - 1`, and the level monthly contribution `c` comes from
//! the ordinary-annuity future-value equation `goal = c * ((1 + m)^n - 1) / m`.
//! At `m == 0` this reduces to `c = goal / n`.

use serde::{Deserialize, Serialize};

use super::{Allocation, AllocationTier};
use crate::error::ValidationError;

/// Highest accepted desired annual rate.
pub const MAX_ANNUAL_RATE: f64 = 0.30;
/// Longest accepted horizon (100 years).
pub const MAX_HORIZON_MONTHS: i64 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRequest {
    pub goal_amount: f64,
    pub horizon_months: i64,
    #[serde(default)]
    pub desired_annual_rate: f64,
}

/// One month of the contribution schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub month: u32,
    /// Sum of contributions paid so far.
    pub contributed: f64,
    /// Balance including growth, at the end of this month.
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsProjection {
    pub monthly_contribution: f64,
    pub monthly_rate: f64,
    pub allocation_tier: AllocationTier,
    pub allocation: Allocation,
    pub projected_value_at_horizon: f64,
    pub schedule: Vec<ScheduleEntry>,
}

impl SavingsRequest {
    pub fn new(goal_amount: f64, horizon_months: i64, desired_annual_rate: f64) -> Self {
        Self {
            goal_amount,
            horizon_months,
            desired_annual_rate,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.goal_amount.is_finite() || self.goal_amount <= 0.0 {
            return Err(ValidationError::new("goal_amount", "must be greater than 0"));
        }
        if self.horizon_months <= 0 {
            return Err(ValidationError::new("horizon_months", "must be greater than 0"));
        }
        if self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(ValidationError::new(
                "horizon_months",
                format!("must be at most {MAX_HORIZON_MONTHS}"),
            ));
        }
        if !(0.0..=MAX_ANNUAL_RATE).contains(&self.desired_annual_rate) {
            return Err(ValidationError::new(
                "desired_annual_rate",
                format!("must be between 0 and {MAX_ANNUAL_RATE}"),
            ));
        }
        Ok(())
    }
}

/// `(1 + annual)^(1/12) - 1`
pub fn effective_monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Accumulation factor `((1 + m)^n - 1) / m`, or `n` when `m == 0`.
pub fn annuity_factor(monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        months as f64
    } else {
        ((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate
    }
}

/// Level monthly contribution that reaches `goal_amount` after `months` deposits.
pub fn monthly_contribution(goal_amount: f64, months: u32, monthly_rate: f64) -> f64 {
    if monthly_rate == 0.0 {
        goal_amount / months as f64
    } else {
        goal_amount * monthly_rate / ((1.0 + monthly_rate).powi(months as i32) - 1.0)
    }
}

/// Validate the request and compute the projection.
pub fn project_savings(request: &SavingsRequest) -> Result<SavingsProjection, ValidationError> {
    request.validate()?;

    let months = request.horizon_months as u32;
    let m = effective_monthly_rate(request.desired_annual_rate);
    let contribution = monthly_contribution(request.goal_amount, months, m);
    let tier = AllocationTier::for_rate(request.desired_annual_rate);

    let schedule = (1..=months)
        .map(|month| ScheduleEntry {
            month,
            contributed: contribution * month as f64,
            balance: contribution * annuity_factor(m, month),
        })
        .collect();

    Ok(SavingsProjection {
        monthly_contribution: contribution,
        monthly_rate: m,
        allocation_tier: tier,
        allocation: tier.allocation(),
        projected_value_at_horizon: contribution * annuity_factor(m, months),
        schedule,
    })
}
