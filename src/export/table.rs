//! Wide per-isolate export table.

use crate::data::Dataset;
use crate::error::{AmrError, Result};
use crate::profile::{profile_signature, ProfileRanking, RiskStratification};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A rectangular table of strings with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Index of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of a named column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Write the table as comma-separated values.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

pub(crate) const METADATA_HEADERS: [&str; 6] =
    ["SNO", "SAMPLE_TYPE", "GENDER", "ESBL", "MDR", "MAR_INDEX"];

/// Merge each isolate's original fields with its risk tier and resistance
/// profile.
///
/// Adds `RISK_TIER`, `RESISTANCE_PROFILE` (resistant antibiotics in
/// vocabulary order, comma-delimited) and `PROFILE_RANK` (the isolate's
/// profile rank among MDR isolates, blank for non-MDR isolates). `risk` and
/// `profiles` must have been computed on `dataset`.
pub fn assemble(
    dataset: &Dataset,
    risk: &RiskStratification,
    profiles: &ProfileRanking,
) -> Result<ExportTable> {
    if risk.isolates.len() != dataset.n_isolates() {
        return Err(AmrError::InvalidParameter(format!(
            "Risk tiers cover {} isolates but the dataset has {}",
            risk.isolates.len(),
            dataset.n_isolates()
        )));
    }
    let n_mdr = dataset.isolates().iter().filter(|i| i.mdr).count();
    if profiles.n_mdr != n_mdr {
        return Err(AmrError::InvalidParameter(format!(
            "Profile ranking covers {} MDR isolates but the dataset has {}",
            profiles.n_mdr, n_mdr
        )));
    }

    let mut headers: Vec<String> = METADATA_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(dataset.antibiotics().iter().cloned());
    headers.extend(["RISK_TIER", "RESISTANCE_PROFILE", "PROFILE_RANK"].map(String::from));

    let ranks = profiles.rank_lookup(dataset.antibiotics());
    let rows = dataset
        .isolates()
        .iter()
        .enumerate()
        .map(|(row, iso)| {
            let signature = profile_signature(dataset, row);
            let rank = if iso.mdr {
                ranks
                    .get(&dataset.resistant_columns(row))
                    .map(|r| r.to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            };

            let mut cells = vec![
                iso.id.clone(),
                iso.sample_type.clone(),
                iso.gender.as_str().to_string(),
                yes_no(iso.esbl).to_string(),
                yes_no(iso.mdr).to_string(),
                iso.mar_index.to_string(),
            ];
            cells.extend(
                dataset
                    .row_calls(row)
                    .iter()
                    .map(|c| c.map(|c| c.code().to_string()).unwrap_or_default()),
            );
            cells.push(risk.isolates[row].tier.name().to_string());
            cells.push(signature);
            cells.push(rank);
            cells
        })
        .collect();

    Ok(ExportTable { headers, rows })
}
