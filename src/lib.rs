//! Composable Antimicrobial Resistance (AMR) Surveillance Library
//!
//! This library computes descriptive surveillance statistics from tables of
//! clinical isolates: susceptibility distributions, MDR/ESBL prevalence, MAR
//! index risk tiers, co-resistance matrices and ranked MDR resistance
//! profiles.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Isolate, Dataset) and the CSV/TSV loader
//! - **filter**: Gender and sample-type filtering
//! - **profile**: Aggregators (distribution, prevalence, risk, co-resistance,
//!   profile ranking, MAR summary, consistency audit)
//! - **export**: Export-ready wide and long tables
//! - **pipeline**: Analysis configuration and execution
//!
//! # Example
//!
//! ```no_run
//! use amr_surveillance::prelude::*;
//!
//! // Load data
//! let dataset = Dataset::from_csv("isolates.csv", &LoadOptions::default()).unwrap();
//!
//! // Run analysis on urine isolates
//! let report = Analysis::new()
//!     .filter(FilterRequest::all().sample_type("URINE"))
//!     .top_profiles(10)
//!     .run(&dataset)
//!     .unwrap();
//!
//! println!("{}", report);
//! ```

pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod profile;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{Call, Dataset, Gender, Isolate, LoadOptions};
    pub use crate::error::{AmrError, Result};
    pub use crate::export::{assemble, long_format, ExportTable};
    pub use crate::filter::{filter_dataset, FilterRequest};
    pub use crate::pipeline::{Analysis, AnalysisConfig, SurveillanceReport};
    pub use crate::profile::{
        // Aggregators
        audit_consistency, prevalence_by, profile_co_resistance, profile_distribution,
        profile_prevalence, rank_profiles, stratify_risk, stratify_risk_with_threshold,
        summarize_mar,
        // Results
        CoResistanceMatrix, ConsistencyIssue, Distribution, GroupBy, GroupPrevalence, IssueKind,
        MarSummary, Prevalence, ProfileRanking, ResistanceProfile, RiskStratification, RiskTier,
        SusceptibilityCounts,
    };
}
