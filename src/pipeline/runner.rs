//! Analysis runner: filter once, then compute every surveillance summary.

use crate::data::Dataset;
use crate::error::{AmrError, Result};
use crate::export::{assemble, ExportTable};
use crate::filter::{filter_dataset, FilterRequest};
use crate::profile::{
    audit_consistency, prevalence_by, profile_co_resistance, profile_distribution,
    profile_prevalence, rank_profiles, stratify_risk_with_threshold, summarize_mar,
    CoResistanceMatrix, ConsistencyIssue, Distribution, GroupBy, GroupPrevalence, MarSummary,
    Prevalence, ProfileRanking, RiskStratification, DEFAULT_MAR_BINS, DEFAULT_RISK_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Analysis configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Isolate filter applied before any aggregation.
    pub filter: FilterRequest,
    /// MAR index at or below which an isolate is low risk.
    pub risk_threshold: f64,
    /// Number of profiles shown in summaries (0 = all).
    pub top_profiles: usize,
    /// Number of MAR histogram bins.
    pub mar_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: "amr-surveillance".to_string(),
            description: None,
            filter: FilterRequest::default(),
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            top_profiles: 10,
            mar_bins: DEFAULT_MAR_BINS,
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(AmrError::from)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.risk_threshold) {
            return Err(AmrError::InvalidParameter(format!(
                "risk_threshold must be between 0 and 1, got {}",
                self.risk_threshold
            )));
        }
        if self.mar_bins == 0 {
            return Err(AmrError::InvalidParameter(
                "mar_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every summary computed for one filtered dataset.
#[derive(Debug, Clone, Serialize)]
pub struct SurveillanceReport {
    pub name: String,
    /// RFC 3339 timestamp of when the report was generated.
    pub generated: String,
    pub filter: FilterRequest,
    /// Isolates before filtering.
    pub total_isolates: usize,
    /// Isolates after filtering.
    pub filtered_isolates: usize,
    pub antibiotics: Vec<String>,
    pub prevalence: Prevalence,
    pub prevalence_by_gender: Vec<GroupPrevalence>,
    pub prevalence_by_sample_type: Vec<GroupPrevalence>,
    pub distribution: Distribution,
    pub risk: RiskStratification,
    pub mar: MarSummary,
    pub co_resistance: CoResistanceMatrix,
    pub profiles: ProfileRanking,
    /// Profiles listed in text summaries (0 = all).
    pub top_profiles: usize,
    pub consistency: Vec<ConsistencyIssue>,
}

impl SurveillanceReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Per-isolate export table for the filtered dataset this report was
    /// computed on.
    pub fn export_table(&self, filtered: &Dataset) -> Result<ExportTable> {
        assemble(filtered, &self.risk, &self.profiles)
    }
}

impl std::fmt::Display for SurveillanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AMR Surveillance Report: {}", self.name)?;
        writeln!(f, "==========================")?;
        writeln!(f, "Generated: {}", self.generated)?;
        writeln!(f, "Filter:    {}", self.filter)?;
        writeln!(
            f,
            "Isolates:  {} of {} ({} antibiotics)",
            self.filtered_isolates,
            self.total_isolates,
            self.antibiotics.len()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.prevalence)?;
        for (title, groups) in [
            ("By gender", &self.prevalence_by_gender),
            ("By sample type", &self.prevalence_by_sample_type),
        ] {
            writeln!(f, "  {}:", title)?;
            for g in groups {
                writeln!(
                    f,
                    "    {:<16} n={:<5} MDR {:>5.1}%  ESBL {:>5.1}%",
                    g.group, g.prevalence.total, g.prevalence.mdr_percent, g.prevalence.esbl_percent
                )?;
            }
        }
        writeln!(f)?;
        write!(f, "{}", self.distribution)?;
        writeln!(f)?;
        write!(f, "{}", self.risk)?;
        writeln!(f)?;
        write!(f, "{}", self.mar)?;
        writeln!(f)?;
        write!(f, "{}", self.co_resistance)?;
        writeln!(f)?;

        let shown = self.profiles.top(self.top_profiles);
        writeln!(
            f,
            "Top MDR Resistance Profiles ({} of {} distinct, {} MDR isolates)",
            shown.len(),
            self.profiles.len(),
            self.profiles.n_mdr
        )?;
        for (i, p) in shown.iter().enumerate() {
            let label = if p.is_empty() {
                "(no resistant calls)".to_string()
            } else {
                p.signature()
            };
            writeln!(f, "  {:>3}. {:<50} {:>5} ({:.1}%)", i + 1, label, p.count, p.percent)?;
        }

        if !self.consistency.is_empty() {
            writeln!(f)?;
            writeln!(f, "Data Quality ({} MDR flag inconsistencies)", self.consistency.len())?;
            for issue in &self.consistency {
                writeln!(f, "  {}", issue)?;
            }
        }
        Ok(())
    }
}

/// Builder for configuring and running a surveillance analysis.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Create an analysis with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Set the isolate filter.
    pub fn filter(mut self, filter: FilterRequest) -> Self {
        self.config.filter = filter;
        self
    }

    /// Set the MAR risk threshold.
    pub fn risk_threshold(mut self, threshold: f64) -> Self {
        self.config.risk_threshold = threshold;
        self
    }

    /// Set how many profiles text summaries list (0 = all).
    pub fn top_profiles(mut self, n: usize) -> Self {
        self.config.top_profiles = n;
        self
    }

    /// Set the number of MAR histogram bins.
    pub fn mar_bins(mut self, n: usize) -> Self {
        self.config.mar_bins = n;
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self) -> AnalysisConfig {
        self.config.clone()
    }

    /// Apply this analysis' filter to a dataset.
    pub fn filtered(&self, dataset: &Dataset) -> Dataset {
        filter_dataset(dataset, &self.config.filter)
    }

    /// Run the analysis on a dataset.
    pub fn run(&self, dataset: &Dataset) -> Result<SurveillanceReport> {
        self.config.validate()?;
        info!(
            name = %self.config.name,
            isolates = dataset.n_isolates(),
            antibiotics = dataset.n_antibiotics(),
            "running analysis"
        );

        let filtered = self.filtered(dataset);
        info!(filter = %self.config.filter, kept = filtered.n_isolates(), "applied filter");

        let prevalence = profile_prevalence(&filtered);
        let prevalence_by_gender = prevalence_by(&filtered, GroupBy::Gender);
        let prevalence_by_sample_type = prevalence_by(&filtered, GroupBy::SampleType);
        debug!(mdr = prevalence.mdr_count, esbl = prevalence.esbl_count, "prevalence");

        let distribution = profile_distribution(&filtered);
        let risk = stratify_risk_with_threshold(&filtered, self.config.risk_threshold)?;
        let mar = summarize_mar(&filtered, self.config.mar_bins)?;
        let co_resistance = profile_co_resistance(&filtered);
        let profiles = rank_profiles(&filtered);
        debug!(distinct = profiles.len(), mdr = profiles.n_mdr, "ranked resistance profiles");
        let consistency = audit_consistency(&filtered);

        Ok(SurveillanceReport {
            name: self.config.name.clone(),
            generated: chrono::Utc::now().to_rfc3339(),
            filter: self.config.filter.clone(),
            total_isolates: dataset.n_isolates(),
            filtered_isolates: filtered.n_isolates(),
            antibiotics: filtered.antibiotics().to_vec(),
            prevalence,
            prevalence_by_gender,
            prevalence_by_sample_type,
            distribution,
            risk,
            mar,
            co_resistance,
            profiles,
            top_profiles: self.config.top_profiles,
            consistency,
        })
    }
}
