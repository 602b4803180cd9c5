//! Per-antibiotic susceptibility distribution.

use super::percent;
use crate::data::{Call, Dataset};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// S/I/R counts for one antibiotic over the isolates tested against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SusceptibilityCounts {
    pub antibiotic: String,
    #[serde(rename = "S")]
    pub s: usize,
    #[serde(rename = "I")]
    pub i: usize,
    #[serde(rename = "R")]
    pub r: usize,
    /// Isolates with any call; always `s + i + r`.
    pub tested: usize,
}

impl SusceptibilityCounts {
    /// Count for one category.
    pub fn count(&self, call: Call) -> usize {
        match call {
            Call::S => self.s,
            Call::I => self.i,
            Call::R => self.r,
        }
    }

    /// Percentage of tested isolates in a category (0 when none tested).
    pub fn percent(&self, call: Call) -> f64 {
        percent(self.count(call), self.tested)
    }

    pub fn percent_resistant(&self) -> f64 {
        self.percent(Call::R)
    }
}

/// Susceptibility distribution across the whole vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Number of isolates in the dataset.
    pub n_isolates: usize,
    /// One entry per antibiotic, in vocabulary order.
    pub antibiotics: Vec<SusceptibilityCounts>,
}

impl Distribution {
    /// Look up counts for an antibiotic.
    pub fn get(&self, antibiotic: &str) -> Option<&SusceptibilityCounts> {
        self.antibiotics.iter().find(|c| c.antibiotic == antibiotic)
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Susceptibility Distribution ({} isolates)", self.n_isolates)?;
        writeln!(
            f,
            "  {:<28} {:>7} {:>8} {:>8} {:>8}",
            "Antibiotic", "Tested", "S%", "I%", "R%"
        )?;
        for c in &self.antibiotics {
            writeln!(
                f,
                "  {:<28} {:>7} {:>7.1}% {:>7.1}% {:>7.1}%",
                c.antibiotic,
                c.tested,
                c.percent(Call::S),
                c.percent(Call::I),
                c.percent(Call::R)
            )?;
        }
        Ok(())
    }
}

/// Count S/I/R calls per antibiotic.
///
/// Untested isolates are excluded from an antibiotic's totals entirely.
pub fn profile_distribution(dataset: &Dataset) -> Distribution {
    let antibiotics: Vec<SusceptibilityCounts> = (0..dataset.n_antibiotics())
        .into_par_iter()
        .map(|col| {
            let (mut s, mut i, mut r) = (0, 0, 0);
            for row in 0..dataset.n_isolates() {
                match dataset.call(row, col) {
                    Some(Call::S) => s += 1,
                    Some(Call::I) => i += 1,
                    Some(Call::R) => r += 1,
                    None => {}
                }
            }
            SusceptibilityCounts {
                antibiotic: dataset.antibiotics()[col].clone(),
                s,
                i,
                r,
                tested: s + i + r,
            }
        })
        .collect();

    Distribution {
        n_isolates: dataset.n_isolates(),
        antibiotics,
    }
}
