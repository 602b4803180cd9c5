//! Descriptive surveillance statistics over isolate datasets.
//!
//! Every function here is pure: it reads a [`Dataset`](crate::data::Dataset)
//! and returns an owned summary. Empty inputs yield zero counts and 0%
//! rather than errors.

mod co_resistance;
mod consistency;
mod distribution;
mod mar;
mod prevalence;
mod ranking;
mod risk;

pub use co_resistance::{profile_co_resistance, CoResistanceMatrix};
pub use consistency::{audit_consistency, ConsistencyIssue, IssueKind, NON_MDR_RESISTANCE_LIMIT};
pub use distribution::{profile_distribution, Distribution, SusceptibilityCounts};
pub use mar::{summarize_mar, MarBin, MarSummary, DEFAULT_MAR_BINS};
pub use prevalence::{prevalence_by, profile_prevalence, GroupBy, GroupPrevalence, Prevalence};
pub use ranking::{profile_signature, rank_profiles, ProfileRanking, ResistanceProfile};
pub use risk::{
    stratify_risk, stratify_risk_with_threshold, IsolateRisk, RiskStratification, RiskTier,
    TierSummary, DEFAULT_RISK_THRESHOLD,
};

/// Percentage of `count` in `total`, defined as 0 when `total` is 0.
#[inline]
pub(crate) fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
