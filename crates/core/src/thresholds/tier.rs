//! Risk tiers and their presentation

use serde::{Deserialize, Serialize};

/// Classification tier of a unit within its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Sort priority, 1 is most urgent
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            RiskTier::High => 1,
            RiskTier::Medium => 2,
            RiskTier::Low => 3,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            RiskTier::High => "High Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::Low => "Low Risk",
        }
    }

    /// Display color (hex)
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            RiskTier::High => "#dc2626",
            RiskTier::Medium => "#f59e0b",
            RiskTier::Low => "#16a34a",
        }
    }

    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Medium, RiskTier::Low];
}

/// A tier with its presentation attributes, as delivered to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevel {
    pub tier: RiskTier,
    pub label: String,
    pub color: String,
    pub priority: u8,
}

impl From<RiskTier> for RiskLevel {
    fn from(tier: RiskTier) -> Self {
        Self {
            tier,
            label: tier.label().to_string(),
            color: tier.color().to_string(),
            priority: tier.priority(),
        }
    }
}
