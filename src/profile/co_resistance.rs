//! Pairwise co-resistance between antibiotics.
//!
//! Counts come from Gram products of isolate × antibiotic indicator
//! matrices: `Tᵀ·T` gives the number of isolates tested on both antibiotics
//! of a pair, `Rᵀ·R` the number resistant to both.

use super::percent;
use crate::data::{Call, Dataset};
use nalgebra::{DMatrix, Scalar};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Symmetric antibiotic × antibiotic co-resistance statistics.
///
/// Rows and columns follow the dataset's vocabulary order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoResistanceMatrix {
    pub antibiotics: Vec<String>,
    /// Percent of co-tested isolates resistant to both; the diagonal is each
    /// antibiotic's own resistance percentage.
    #[serde(serialize_with = "serialize_rows")]
    pub percent: DMatrix<f64>,
    /// Isolates tested against both antibiotics.
    #[serde(serialize_with = "serialize_rows")]
    pub co_tested: DMatrix<usize>,
    /// Isolates resistant to both antibiotics.
    #[serde(serialize_with = "serialize_rows")]
    pub co_resistant: DMatrix<usize>,
    /// Pairs with no co-tested isolates. Their percentage is 0 but carries no
    /// information.
    #[serde(serialize_with = "serialize_rows")]
    pub undefined: DMatrix<bool>,
    /// Phi coefficient between resistance indicators over all isolates,
    /// untested counting as not resistant. `None` where either indicator is
    /// constant.
    #[serde(serialize_with = "serialize_rows")]
    pub phi: DMatrix<Option<f64>>,
}

impl CoResistanceMatrix {
    /// Matrix dimension (number of antibiotics).
    pub fn dim(&self) -> usize {
        self.antibiotics.len()
    }

    fn index(&self, antibiotic: &str) -> Option<usize> {
        self.antibiotics.iter().position(|a| a == antibiotic)
    }

    /// Co-resistance percentage for a named pair.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.percent[(self.index(a)?, self.index(b)?)])
    }

    /// Co-tested denominator for a named pair.
    pub fn co_tested_count(&self, a: &str, b: &str) -> Option<usize> {
        Some(self.co_tested[(self.index(a)?, self.index(b)?)])
    }

    /// Check whether a named pair has no co-tested isolates.
    pub fn is_undefined(&self, a: &str, b: &str) -> Option<bool> {
        Some(self.undefined[(self.index(a)?, self.index(b)?)])
    }
}

impl std::fmt::Display for CoResistanceMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Co-Resistance (% of co-tested isolates resistant to both)")?;
        write!(f, "  {:<12}", "")?;
        for name in &self.antibiotics {
            write!(f, " {:>8}", truncate(name, 8))?;
        }
        writeln!(f)?;
        for (i, name) in self.antibiotics.iter().enumerate() {
            write!(f, "  {:<12}", truncate(name, 12))?;
            for j in 0..self.dim() {
                if self.undefined[(i, j)] {
                    write!(f, " {:>8}", "n/a")?;
                } else {
                    write!(f, " {:>7.1}%", self.percent[(i, j)])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn serialize_rows<T, S>(matrix: &DMatrix<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Scalar + Serialize,
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(matrix.nrows()))?;
    for row in matrix.row_iter() {
        let values: Vec<&T> = row.iter().collect();
        seq.serialize_element(&values)?;
    }
    seq.end()
}

/// Pair counts `Xᵀ·X` for a 0/1 indicator matrix.
fn pair_counts(indicator: &DMatrix<f64>) -> DMatrix<usize> {
    let k = indicator.ncols();
    if indicator.nrows() == 0 {
        return DMatrix::zeros(k, k);
    }
    (indicator.transpose() * indicator).map(|v| v.round() as usize)
}

fn phi(n: usize, both: usize, a: usize, b: usize) -> Option<f64> {
    let (n, both, a, b) = (n as f64, both as f64, a as f64, b as f64);
    let denom = (a * (n - a) * b * (n - b)).sqrt();
    if denom == 0.0 {
        None
    } else {
        Some((n * both - a * b) / denom)
    }
}

/// Build the co-resistance matrix for a dataset.
///
/// Entry (a, b) is the share of isolates tested against both a and b that
/// are resistant to both. A pair with no co-tested isolates is 0 and flagged
/// in `undefined`.
pub fn profile_co_resistance(dataset: &Dataset) -> CoResistanceMatrix {
    let n = dataset.n_isolates();
    let k = dataset.n_antibiotics();

    let tested = DMatrix::from_fn(n, k, |r, c| {
        if dataset.call(r, c).is_some() {
            1.0
        } else {
            0.0
        }
    });
    let resistant = DMatrix::from_fn(n, k, |r, c| {
        if dataset.call(r, c) == Some(Call::R) {
            1.0
        } else {
            0.0
        }
    });

    let co_tested = pair_counts(&tested);
    let co_resistant = pair_counts(&resistant);

    let percent_matrix =
        DMatrix::from_fn(k, k, |a, b| percent(co_resistant[(a, b)], co_tested[(a, b)]));
    let undefined = co_tested.map(|c| c == 0);
    let phi_matrix = DMatrix::from_fn(k, k, |a, b| {
        phi(n, co_resistant[(a, b)], co_resistant[(a, a)], co_resistant[(b, b)])
    });

    CoResistanceMatrix {
        antibiotics: dataset.antibiotics().to_vec(),
        percent: percent_matrix,
        co_tested,
        co_resistant,
        undefined,
        phi: phi_matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Gender, Isolate};
    use crate::profile::profile_distribution;
    use approx::assert_relative_eq;

    fn isolate(id: &str) -> Isolate {
        Isolate::new(id, "Urine", Gender::Male, false, false, 0.1)
    }

    /// AMP = [R, R, S, I], CIP = [R, S, S, R]
    fn create_test_dataset() -> Dataset {
        Dataset::new(vec![
            isolate("1").with_result("AMP", Call::R).with_result("CIP", Call::R),
            isolate("2").with_result("AMP", Call::R).with_result("CIP", Call::S),
            isolate("3").with_result("AMP", Call::S).with_result("CIP", Call::S),
            isolate("4").with_result("AMP", Call::I).with_result("CIP", Call::R),
        ])
        .unwrap()
    }

    #[test]
    fn test_pair_percentage() {
        let m = profile_co_resistance(&create_test_dataset());
        assert_eq!(m.co_tested_count("AMP", "CIP"), Some(4));
        // Only isolate 1 is R on both
        assert_eq!(m.co_resistant[(0, 1)], 1);
        assert_relative_eq!(m.get("AMP", "CIP").unwrap(), 25.0);
    }

    #[test]
    fn test_co_tested_denominator() {
        // GEN tested on two isolates only; both are R on AMP and GEN.
        let ds = Dataset::new(vec![
            isolate("1").with_result("AMP", Call::R).with_result("GEN", Call::R),
            isolate("2").with_result("AMP", Call::R).with_result("GEN", Call::R),
            isolate("3").with_result("AMP", Call::S),
            isolate("4").with_result("AMP", Call::S),
        ])
        .unwrap();
        let m = profile_co_resistance(&ds);
        assert_eq!(m.co_tested_count("AMP", "GEN"), Some(2));
        assert_relative_eq!(m.get("AMP", "GEN").unwrap(), 100.0);
    }

    #[test]
    fn test_symmetric_with_distribution_diagonal() {
        let ds = Dataset::new(vec![
            isolate("1").with_result("AMP", Call::R).with_result("CIP", Call::R).with_result("GEN", Call::S),
            isolate("2").with_result("AMP", Call::R).with_result("GEN", Call::R),
            isolate("3").with_result("CIP", Call::I).with_result("GEN", Call::R),
            isolate("4").with_result("AMP", Call::S).with_result("CIP", Call::R),
        ])
        .unwrap();
        let m = profile_co_resistance(&ds);
        let dist = profile_distribution(&ds);

        for a in 0..m.dim() {
            for b in 0..m.dim() {
                assert_eq!(m.percent[(a, b)], m.percent[(b, a)]);
                assert_eq!(m.undefined[(a, b)], m.undefined[(b, a)]);
            }
            assert_eq!(m.percent[(a, a)], dist.antibiotics[a].percent_resistant());
        }
    }

    #[test]
    fn test_undefined_pairs_flagged() {
        let ds = Dataset::new(vec![
            isolate("1").with_result("AMP", Call::R),
            isolate("2").with_result("CIP", Call::R),
        ])
        .unwrap();
        let m = profile_co_resistance(&ds);
        assert_eq!(m.get("AMP", "CIP"), Some(0.0));
        assert_eq!(m.is_undefined("AMP", "CIP"), Some(true));
        assert_eq!(m.is_undefined("AMP", "AMP"), Some(false));
        assert_eq!(m.get("AMP", "MEM"), None);
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::with_antibiotics(vec!["AMP".into(), "CIP".into()], vec![]).unwrap();
        let m = profile_co_resistance(&ds);
        assert_eq!(m.dim(), 2);
        assert!(m.percent.iter().all(|&p| p == 0.0));
        assert!(m.undefined.iter().all(|&u| u));
        assert!(m.phi.iter().all(|p| p.is_none()));
    }

    #[test]
    fn test_phi_correlation() {
        let m = profile_co_resistance(&create_test_dataset());
        // AMP R = [1,1,0,0], CIP R = [1,0,0,1] are uncorrelated
        assert_relative_eq!(m.phi[(0, 1)].unwrap(), 0.0);
        assert_relative_eq!(m.phi[(0, 0)].unwrap(), 1.0);

        let ds = Dataset::new(vec![
            isolate("1").with_result("AMP", Call::S).with_result("CIP", Call::S),
            isolate("2").with_result("AMP", Call::S).with_result("CIP", Call::R),
        ])
        .unwrap();
        // AMP has no resistance: constant indicator
        assert!(profile_co_resistance(&ds).phi[(0, 1)].is_none());
    }

    #[test]
    fn test_serializes_as_rows() {
        let m = profile_co_resistance(&create_test_dataset());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["percent"][0][1], serde_json::json!(25.0));
        assert_eq!(json["co_tested"][1][0], serde_json::json!(4));
        assert_eq!(json["percent"][1][1], serde_json::json!(50.0));
    }
}
