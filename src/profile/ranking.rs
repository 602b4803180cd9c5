//! Resistance profile ranking among MDR isolates.

use super::percent;
use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Delimiter used when rendering a profile as a single string.
pub const PROFILE_DELIMITER: &str = ",";

/// A distinct set of resistant antibiotics and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistanceProfile {
    /// Resistant antibiotics in vocabulary order. May be empty.
    pub antibiotics: Vec<String>,
    /// Number of MDR isolates with exactly this set.
    pub count: usize,
    /// Share of all MDR isolates.
    pub percent: f64,
}

impl ResistanceProfile {
    /// The profile rendered as a delimited string (empty for the empty set).
    pub fn signature(&self) -> String {
        self.antibiotics.join(PROFILE_DELIMITER)
    }

    pub fn is_empty(&self) -> bool {
        self.antibiotics.is_empty()
    }
}

/// MDR resistance profiles ranked by frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRanking {
    /// Number of MDR isolates the ranking covers.
    pub n_mdr: usize,
    /// Profiles, most frequent first.
    pub profiles: Vec<ResistanceProfile>,
}

impl ProfileRanking {
    /// The `n` most frequent profiles; `0` returns all of them.
    pub fn top(&self, n: usize) -> &[ResistanceProfile] {
        if n == 0 {
            &self.profiles
        } else {
            &self.profiles[..n.min(self.profiles.len())]
        }
    }

    /// One-based rank of every profile, keyed by its resistant columns in
    /// `vocabulary`. Profiles naming an antibiotic outside the vocabulary are
    /// left out.
    pub fn rank_lookup(&self, vocabulary: &[String]) -> HashMap<Vec<usize>, usize> {
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        self.profiles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let cols = p
                    .antibiotics
                    .iter()
                    .map(|a| index.get(a.as_str()).copied())
                    .collect::<Option<Vec<usize>>>()?;
                Some((cols, i + 1))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl std::fmt::Display for ProfileRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MDR Resistance Profiles ({} MDR isolates)", self.n_mdr)?;
        for (i, p) in self.profiles.iter().enumerate() {
            let label = if p.is_empty() {
                "(no resistant calls)".to_string()
            } else {
                p.signature()
            };
            writeln!(f, "  {:>3}. {:<50} {:>5} ({:.1}%)", i + 1, label, p.count, p.percent)?;
        }
        Ok(())
    }
}

/// Resistance profile of the isolate at `row`, as a delimited string in
/// vocabulary order.
pub fn profile_signature(dataset: &Dataset, row: usize) -> String {
    dataset.resistant_antibiotics(row).join(PROFILE_DELIMITER)
}

/// Group MDR isolates by their set of resistant antibiotics and rank the
/// groups.
///
/// Order is count descending, then signature ascending. MDR isolates without
/// any resistant call form the empty profile rather than being dropped.
pub fn rank_profiles(dataset: &Dataset) -> ProfileRanking {
    let mut groups: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut n_mdr = 0;

    for (row, iso) in dataset.isolates().iter().enumerate() {
        if !iso.mdr {
            continue;
        }
        n_mdr += 1;
        *groups.entry(dataset.resistant_columns(row)).or_insert(0) += 1;
    }

    let names = dataset.antibiotics();
    let mut ranked: Vec<(Vec<usize>, ResistanceProfile)> = groups
        .into_iter()
        .map(|(cols, count)| {
            let profile = ResistanceProfile {
                antibiotics: cols.iter().map(|&c| names[c].clone()).collect(),
                count,
                percent: percent(count, n_mdr),
            };
            (cols, profile)
        })
        .collect();

    // Column indices settle signatures that render identically.
    ranked.sort_by(|(ka, a), (kb, b)| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.signature().cmp(&b.signature()))
            .then_with(|| ka.cmp(kb))
    });

    ProfileRanking {
        n_mdr,
        profiles: ranked.into_iter().map(|(_, p)| p).collect(),
    }
}
