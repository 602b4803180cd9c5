//! MDR and ESBL prevalence, overall and per group.

use super::percent;
use crate::data::{Dataset, Isolate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// MDR and ESBL burden over a set of isolates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prevalence {
    /// Number of isolates considered.
    pub total: usize,
    pub mdr_count: usize,
    pub mdr_percent: f64,
    pub esbl_count: usize,
    pub esbl_percent: f64,
}

impl Prevalence {
    fn from_isolates<'a>(isolates: impl IntoIterator<Item = &'a Isolate>) -> Self {
        let (mut total, mut mdr_count, mut esbl_count) = (0, 0, 0);
        for iso in isolates {
            total += 1;
            mdr_count += usize::from(iso.mdr);
            esbl_count += usize::from(iso.esbl);
        }
        Self {
            total,
            mdr_count,
            mdr_percent: percent(mdr_count, total),
            esbl_count,
            esbl_percent: percent(esbl_count, total),
        }
    }
}

impl std::fmt::Display for Prevalence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Prevalence")?;
        writeln!(f, "  Total isolates: {}", self.total)?;
        writeln!(f, "  MDR:  {} ({:.1}%)", self.mdr_count, self.mdr_percent)?;
        writeln!(f, "  ESBL: {} ({:.1}%)", self.esbl_count, self.esbl_percent)?;
        Ok(())
    }
}

/// Compute MDR and ESBL prevalence over the whole dataset.
pub fn profile_prevalence(dataset: &Dataset) -> Prevalence {
    Prevalence::from_isolates(dataset.isolates())
}

/// Dimension used to break prevalence down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Stored gender value; unrecognized values form their own groups.
    Gender,
    /// Sample type, compared case-insensitively.
    SampleType,
}

/// Prevalence within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPrevalence {
    /// Group label (first-seen casing for sample types).
    pub group: String,
    pub prevalence: Prevalence,
}

/// Compute prevalence per group, in order of each group's first appearance.
pub fn prevalence_by(dataset: &Dataset, by: GroupBy) -> Vec<GroupPrevalence> {
    let mut order: Vec<(String, Vec<&Isolate>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for iso in dataset.isolates() {
        let (key, label) = match by {
            GroupBy::Gender => (iso.gender.as_str().to_string(), iso.gender.as_str()),
            GroupBy::SampleType => (iso.sample_type_key(), iso.sample_type.trim()),
        };
        let slot = *index.entry(key).or_insert_with(|| {
            order.push((label.to_string(), Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(iso);
    }

    order
        .into_iter()
        .map(|(group, members)| GroupPrevalence {
            group,
            prevalence: Prevalence::from_isolates(members),
        })
        .collect()
}
