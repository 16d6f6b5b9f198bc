//! Deterministic savings and investment projections.
//!
//! Everything here is a pure function of its inputs: no clock, no store, no
//! generator. Narratives and audit records are layered on by [`crate::advisor`].

pub mod audit;
pub mod portfolio;
pub mod savings;

use serde::{Deserialize, Serialize};

/// Named portfolio mix, keyed off the desired annual rate (savings) or the
/// risk tolerance (portfolio).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationTier {
    Conservative,
    Balanced,
    Aggressive,
}

/// Percent split between fixed deposits and equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub fixed_deposit_pct: u8,
    pub equity_pct: u8,
}

/// Rates at or below this are CONSERVATIVE.
pub const CONSERVATIVE_MAX_RATE: f64 = 0.05;
/// Rates above [`CONSERVATIVE_MAX_RATE`] and at or below this are BALANCED.
pub const BALANCED_MAX_RATE: f64 = 0.12;

impl AllocationTier {
    /// Tier for a desired annual rate. Boundary values belong to the lower tier.
    pub fn for_rate(annual_rate: f64) -> Self {
        if annual_rate <= CONSERVATIVE_MAX_RATE {
            Self::Conservative
        } else if annual_rate <= BALANCED_MAX_RATE {
            Self::Balanced
        } else {
            Self::Aggressive
        }
    }

    pub fn allocation(&self) -> Allocation {
        match self {
            Self::Conservative => Allocation {
                fixed_deposit_pct: 100,
                equity_pct: 0,
            },
            Self::Balanced => Allocation {
                fixed_deposit_pct: 50,
                equity_pct: 50,
            },
            Self::Aggressive => Allocation {
                fixed_deposit_pct: 25,
                equity_pct: 75,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "CONSERVATIVE",
            Self::Balanced => "BALANCED",
            Self::Aggressive => "AGGRESSIVE",
        }
    }
}

impl std::fmt::Display for AllocationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_belong_to_lower_tier() {
        assert_eq!(AllocationTier::for_rate(0.0), AllocationTier::Conservative);
        assert_eq!(AllocationTier::for_rate(0.05), AllocationTier::Conservative);
        assert_eq!(AllocationTier::for_rate(0.0500001), AllocationTier::Balanced);
        assert_eq!(AllocationTier::for_rate(0.12), AllocationTier::Balanced);
        assert_eq!(AllocationTier::for_rate(0.1200001), AllocationTier::Aggressive);
        assert_eq!(AllocationTier::for_rate(0.30), AllocationTier::Aggressive);
    }

    #[test]
    fn allocations_sum_to_100() {
        for tier in [
            AllocationTier::Conservative,
            AllocationTier::Balanced,
            AllocationTier::Aggressive,
        ] {
            let a = tier.allocation();
            assert_eq!(a.fixed_deposit_pct + a.equity_pct, 100, "{tier}");
        }
        assert_eq!(AllocationTier::Aggressive.allocation().equity_pct, 75);
    }
}
