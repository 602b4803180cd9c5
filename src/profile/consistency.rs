//! Data-quality audit of MDR flags against recorded resistance.
//!
//! Flags are authoritative inputs; issues found here are reported, never
//! corrected.

use crate::data::Dataset;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Resistant-call count at which a non-MDR isolate is reported.
pub const NON_MDR_RESISTANCE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Flagged MDR but no resistant call recorded.
    MdrWithoutResistance,
    /// Not flagged MDR despite many resistant calls.
    ResistantButNotMdr,
}

impl IssueKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::MdrWithoutResistance => "flagged MDR with no resistant calls",
            Self::ResistantButNotMdr => "not flagged MDR despite resistant calls",
        }
    }
}

/// One isolate whose MDR flag disagrees with its calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub row: usize,
    pub id: String,
    pub kind: IssueKind,
    /// Number of resistant calls on the isolate.
    pub n_resistant: usize,
}

impl std::fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "isolate '{}' (row {}): {} ({} R)",
            self.id,
            self.row + 1,
            self.kind.describe(),
            self.n_resistant
        )
    }
}

/// List isolates whose MDR flag is inconsistent with their resistant calls.
pub fn audit_consistency(dataset: &Dataset) -> Vec<ConsistencyIssue> {
    let issues: Vec<ConsistencyIssue> = dataset
        .isolates()
        .iter()
        .enumerate()
        .filter_map(|(row, iso)| {
            let n_resistant = dataset.n_resistant(row);
            let kind = if iso.mdr && n_resistant == 0 {
                IssueKind::MdrWithoutResistance
            } else if !iso.mdr && n_resistant >= NON_MDR_RESISTANCE_LIMIT {
                IssueKind::ResistantButNotMdr
            } else {
                return None;
            };
            Some(ConsistencyIssue {
                row,
                id: iso.id.clone(),
                kind,
                n_resistant,
            })
        })
        .collect();

    if !issues.is_empty() {
        warn!(count = issues.len(), "isolates with MDR flag inconsistencies");
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Call, Gender, Isolate};

    #[test]
    fn test_audit_consistency() {
        let ds = Dataset::new(vec![
            Isolate::new("1", "Urine", Gender::Female, false, true, 0.0).with_result("AMP", Call::S),
            Isolate::new("2", "Urine", Gender::Female, false, false, 0.6)
                .with_result("AMP", Call::R)
                .with_result("CIP", Call::R)
                .with_result("GEN", Call::R),
            Isolate::new("3", "Urine", Gender::Female, false, false, 0.4)
                .with_result("AMP", Call::R)
                .with_result("CIP", Call::R),
            Isolate::new("4", "Urine", Gender::Female, false, true, 0.4).with_result("AMP", Call::R),
        ])
        .unwrap();

        let issues = audit_consistency(&ds);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, "1");
        assert_eq!(issues[0].kind, IssueKind::MdrWithoutResistance);
        assert_eq!(issues[1].id, "2");
        assert_eq!(issues[1].kind, IssueKind::ResistantButNotMdr);
        assert_eq!(issues[1].n_resistant, 3);
    }

    #[test]
    fn test_flags_not_modified() {
        let ds = Dataset::new(vec![Isolate::new("1", "Urine", Gender::Male, false, true, 0.0)]).unwrap();
        let before = ds.clone();
        let _ = audit_consistency(&ds);
        assert_eq!(ds, before);
    }
}
