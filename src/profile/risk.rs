//! MAR index risk stratification.

use super::percent;
use crate::data::Dataset;
use crate::error::{AmrError, Result};
use serde::{Deserialize, Serialize};

/// MAR index at or below which an isolate is classed low risk.
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.2;

/// Exposure-risk tier derived from the MAR index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// MAR index at or below the threshold: likely low antibiotic exposure.
    Low,
    /// MAR index above the threshold: likely high antibiotic exposure.
    High,
}

impl RiskTier {
    /// All tiers in ascending MAR order.
    pub const ALL: [RiskTier; 2] = [RiskTier::Low, RiskTier::High];

    /// Classify a MAR index. The threshold itself is `Low`.
    pub fn from_mar_index(mar_index: f64, threshold: f64) -> Self {
        if mar_index <= threshold {
            Self::Low
        } else {
            Self::High
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tier assignment for one isolate, keyed by dataset position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolateRisk {
    /// Zero-based position in the dataset.
    pub row: usize,
    pub id: String,
    pub mar_index: f64,
    pub tier: RiskTier,
}

/// Aggregate count for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: RiskTier,
    pub count: usize,
    /// Share of the dataset (0 when empty).
    pub percent: f64,
}

/// Result of stratifying a dataset by MAR index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskStratification {
    pub threshold: f64,
    /// One entry per isolate, in dataset order.
    pub isolates: Vec<IsolateRisk>,
    /// One entry per tier, in ascending MAR order.
    pub tiers: Vec<TierSummary>,
}

impl RiskStratification {
    /// Tier of the isolate at `row`.
    pub fn tier_of(&self, row: usize) -> Option<RiskTier> {
        self.isolates.get(row).map(|r| r.tier)
    }

    pub fn count(&self, tier: RiskTier) -> usize {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map_or(0, |t| t.count)
    }
}

impl std::fmt::Display for RiskStratification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MAR Risk Stratification (threshold {})", self.threshold)?;
        for t in &self.tiers {
            writeln!(f, "  {:<5} {:>6} ({:.1}%)", t.tier.name(), t.count, t.percent)?;
        }
        Ok(())
    }
}

/// Stratify isolates with the standard 0.2 MAR threshold.
pub fn stratify_risk(dataset: &Dataset) -> RiskStratification {
    stratify(dataset, DEFAULT_RISK_THRESHOLD)
}

/// Stratify isolates with a custom MAR threshold in [0, 1].
pub fn stratify_risk_with_threshold(dataset: &Dataset, threshold: f64) -> Result<RiskStratification> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AmrError::InvalidParameter(format!(
            "Risk threshold must be between 0 and 1, got {}",
            threshold
        )));
    }
    Ok(stratify(dataset, threshold))
}

fn stratify(dataset: &Dataset, threshold: f64) -> RiskStratification {
    let isolates: Vec<IsolateRisk> = dataset
        .isolates()
        .iter()
        .enumerate()
        .map(|(row, iso)| IsolateRisk {
            row,
            id: iso.id.clone(),
            mar_index: iso.mar_index,
            tier: RiskTier::from_mar_index(iso.mar_index, threshold),
        })
        .collect();

    let total = isolates.len();
    let tiers = RiskTier::ALL
        .iter()
        .map(|&tier| {
            let count = isolates.iter().filter(|r| r.tier == tier).count();
            TierSummary {
                tier,
                count,
                percent: percent(count, total),
            }
        })
        .collect();

    RiskStratification {
        threshold,
        isolates,
        tiers,
    }
}
