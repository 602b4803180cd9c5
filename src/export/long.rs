//! Long-format export: one row per isolate and tested antibiotic.

use super::table::{yes_no, ExportTable, METADATA_HEADERS};
use crate::data::Dataset;

/// Melt the dataset into one row per (isolate, tested antibiotic).
///
/// Columns are the isolate metadata plus `ANTIBIOTIC`, `RESISTANCE_SCORE`
/// (S 0.0, I 0.5, R 1.0) and `RESISTANCE_LABEL`. Untested cells produce no
/// row. Rows follow dataset order, then vocabulary order.
pub fn long_format(dataset: &Dataset) -> ExportTable {
    let mut headers: Vec<String> = METADATA_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(["ANTIBIOTIC", "RESISTANCE_SCORE", "RESISTANCE_LABEL"].map(String::from));

    let mut rows = Vec::new();
    for (row, iso) in dataset.isolates().iter().enumerate() {
        for (col, call) in dataset.row_calls(row).iter().enumerate() {
            let Some(call) = call else { continue };
            rows.push(vec![
                iso.id.clone(),
                iso.sample_type.clone(),
                iso.gender.as_str().to_string(),
                yes_no(iso.esbl).to_string(),
                yes_no(iso.mdr).to_string(),
                iso.mar_index.to_string(),
                dataset.antibiotics()[col].clone(),
                format!("{:.1}", call.score()),
                call.label().to_string(),
            ]);
        }
    }

    ExportTable { headers, rows }
}
