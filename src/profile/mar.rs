//! MAR index summary statistics and histogram.

use crate::data::Dataset;
use crate::error::{AmrError, Result};
use serde::{Deserialize, Serialize};

/// Default number of histogram bins over [0, 1].
pub const DEFAULT_MAR_BINS: usize = 20;

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Descriptive summary of MAR index values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarSummary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Bins over [0, 1]; the last bin includes 1.0.
    pub histogram: Vec<MarBin>,
}

impl std::fmt::Display for MarSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MAR Index")?;
        writeln!(f, "  Isolates: {}", self.n)?;
        writeln!(f, "  Mean:     {:.3}", self.mean)?;
        writeln!(f, "  Median:   {:.3}", self.median)?;
        writeln!(f, "  Range:    {:.3} - {:.3}", self.min, self.max)?;
        Ok(())
    }
}

/// Summarize the MAR index distribution with `n_bins` histogram bins.
pub fn summarize_mar(dataset: &Dataset, n_bins: usize) -> Result<MarSummary> {
    if n_bins == 0 {
        return Err(AmrError::InvalidParameter(
            "MAR histogram needs at least one bin".to_string(),
        ));
    }

    let values: Vec<f64> = dataset.isolates().iter().map(|iso| iso.mar_index).collect();
    let n = values.len();

    let width = 1.0 / n_bins as f64;
    let mut histogram: Vec<MarBin> = (0..n_bins)
        .map(|i| MarBin {
            lower: i as f64 * width,
            upper: (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for &v in &values {
        let idx = ((v * n_bins as f64).floor() as usize).min(n_bins - 1);
        histogram[idx].count += 1;
    }

    if n == 0 {
        return Ok(MarSummary {
            n,
            mean: 0.0,
            median: 0.0,
            min: 0.0,
            max: 0.0,
            histogram,
        });
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Ok(MarSummary {
        n,
        mean,
        median: median(&values),
        min,
        max,
        histogram,
    })
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Gender, Isolate};
    use approx::assert_relative_eq;

    fn dataset_with_mar(values: &[f64]) -> Dataset {
        let isolates = values
            .iter()
            .map(|&mar| Isolate::new("x", "Urine", Gender::Female, false, false, mar))
            .collect();
        Dataset::new(isolates).unwrap()
    }

    #[test]
    fn test_summary_statistics() {
        let summary = summarize_mar(&dataset_with_mar(&[0.1, 0.3, 0.5, 0.9]), DEFAULT_MAR_BINS).unwrap();
        assert_eq!(summary.n, 4);
        assert_relative_eq!(summary.mean, 0.45, epsilon = 1e-12);
        assert_relative_eq!(summary.median, 0.4, epsilon = 1e-12);
        assert_relative_eq!(summary.min, 0.1);
        assert_relative_eq!(summary.max, 0.9);
    }

    #[test]
    fn test_histogram_edges() {
        let summary = summarize_mar(&dataset_with_mar(&[0.0, 0.49, 0.5, 1.0]), 2).unwrap();
        assert_eq!(summary.histogram.len(), 2);
        assert_eq!(summary.histogram[0].count, 2);
        // 1.0 lands in the closed last bin
        assert_eq!(summary.histogram[1].count, 2);
        assert_relative_eq!(summary.histogram[1].upper, 1.0);
    }

    #[test]
    fn test_empty_and_invalid() {
        let summary = summarize_mar(&dataset_with_mar(&[]), 5).unwrap();
        assert_eq!(summary.n, 0);
        assert_eq!(summary.mean, 0.0);
        assert!(summary.histogram.iter().all(|b| b.count == 0));

        assert!(summarize_mar(&dataset_with_mar(&[0.1]), 0).is_err());
    }
}
