//! Validated isolate collection with a fixed antibiotic vocabulary.

use super::isolate::{normalize_sample_type, Call, Isolate};
use crate::error::{AmrError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};

/// An ordered, immutable set of isolates sharing one antibiotic vocabulary.
///
/// Calls are held in a dense isolates × antibiotics table aligned to the
/// vocabulary, so aggregators never look results up by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Isolates in input order.
    isolates: Vec<Isolate>,
    /// Antibiotic names in first-appearance order.
    antibiotics: Vec<String>,
    /// Row-major calls, `None` where untested.
    calls: Vec<Vec<Option<Call>>>,
}

impl Dataset {
    /// Build a dataset, discovering the vocabulary from the isolates' results
    /// in first-appearance order.
    pub fn new(isolates: Vec<Isolate>) -> Result<Self> {
        let mut antibiotics: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for isolate in &isolates {
            for (name, _) in &isolate.results {
                if seen.insert(name.clone()) {
                    antibiotics.push(name.clone());
                }
            }
        }
        Self::with_antibiotics(antibiotics, isolates)
    }

    /// Build a dataset over an explicit vocabulary.
    ///
    /// Antibiotics that no isolate was tested against are kept as columns.
    /// Every result key must belong to the vocabulary.
    pub fn with_antibiotics(antibiotics: Vec<String>, isolates: Vec<Isolate>) -> Result<Self> {
        let calls = dense_calls(&antibiotics, &isolates)?;
        Ok(Self {
            isolates,
            antibiotics,
            calls,
        })
    }

    /// Isolates in order.
    pub fn isolates(&self) -> &[Isolate] {
        &self.isolates
    }

    /// Antibiotic vocabulary in display order.
    pub fn antibiotics(&self) -> &[String] {
        &self.antibiotics
    }

    /// Number of isolates.
    #[inline]
    pub fn n_isolates(&self) -> usize {
        self.isolates.len()
    }

    /// Number of antibiotics in the vocabulary.
    #[inline]
    pub fn n_antibiotics(&self) -> usize {
        self.antibiotics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.isolates.is_empty()
    }

    /// Call for isolate `row` against antibiotic `col`.
    #[inline]
    pub fn call(&self, row: usize, col: usize) -> Option<Call> {
        self.calls[row][col]
    }

    /// All calls for one isolate, aligned to the vocabulary.
    pub fn row_calls(&self, row: usize) -> &[Option<Call>] {
        &self.calls[row]
    }

    /// Position of an antibiotic in the vocabulary.
    pub fn antibiotic_index(&self, name: &str) -> Option<usize> {
        self.antibiotics.iter().position(|a| a == name)
    }

    /// Antibiotics isolate `row` is resistant to, in vocabulary order.
    pub fn resistant_antibiotics(&self, row: usize) -> Vec<&str> {
        self.calls[row]
            .iter()
            .zip(&self.antibiotics)
            .filter(|(call, _)| matches!(call, Some(Call::R)))
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Vocabulary positions isolate `row` is resistant to, ascending.
    pub fn resistant_columns(&self, row: usize) -> Vec<usize> {
        self.calls[row]
            .iter()
            .enumerate()
            .filter(|(_, call)| matches!(call, Some(Call::R)))
            .map(|(col, _)| col)
            .collect()
    }

    /// Number of resistant calls for isolate `row`.
    pub fn n_resistant(&self, row: usize) -> usize {
        self.calls[row]
            .iter()
            .filter(|c| matches!(c, Some(Call::R)))
            .count()
    }

    /// New dataset holding the given rows, in the given order, over the same
    /// vocabulary.
    pub fn subset_rows(&self, rows: &[usize]) -> Self {
        Self {
            isolates: rows.iter().map(|&r| self.isolates[r].clone()).collect(),
            antibiotics: self.antibiotics.clone(),
            calls: rows.iter().map(|&r| self.calls[r].clone()).collect(),
        }
    }

    /// Distinct stored gender values, sorted.
    pub fn genders(&self) -> Vec<String> {
        let mut levels: Vec<String> = self
            .isolates
            .iter()
            .map(|iso| iso.gender.as_str().to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        levels.sort();
        levels
    }

    /// Distinct sample types, compared case-insensitively and sorted by the
    /// normalized key. Each is labelled with its first-seen casing.
    pub fn sample_types(&self) -> Vec<String> {
        let mut by_key: BTreeMap<String, &str> = BTreeMap::new();
        for iso in &self.isolates {
            by_key
                .entry(normalize_sample_type(&iso.sample_type))
                .or_insert(iso.sample_type.trim());
        }
        by_key.into_values().map(String::from).collect()
    }
}

/// Validate isolates against the vocabulary and lay their calls out densely.
fn dense_calls(antibiotics: &[String], isolates: &[Isolate]) -> Result<Vec<Vec<Option<Call>>>> {
    let index: HashMap<&str, usize> = antibiotics
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    if index.len() != antibiotics.len() {
        return Err(AmrError::InvalidParameter(
            "Antibiotic vocabulary contains duplicate names".to_string(),
        ));
    }

    let mut calls = Vec::with_capacity(isolates.len());
    for (i, isolate) in isolates.iter().enumerate() {
        let row = i + 1;
        if !isolate.mar_index.is_finite() || !(0.0..=1.0).contains(&isolate.mar_index) {
            return Err(AmrError::InvalidMarIndex {
                row,
                id: isolate.id.clone(),
                value: isolate.mar_index.to_string(),
            });
        }

        let mut dense = vec![None; antibiotics.len()];
        for (name, call) in &isolate.results {
            let col = *index.get(name.as_str()).ok_or_else(|| {
                AmrError::InvalidParameter(format!(
                    "Antibiotic '{}' on isolate '{}' is not in the vocabulary",
                    name, isolate.id
                ))
            })?;
            if dense[col].is_some() {
                return Err(AmrError::DuplicateAntibiotic {
                    row,
                    id: isolate.id.clone(),
                    antibiotic: name.clone(),
                });
            }
            dense[col] = Some(*call);
        }
        calls.push(dense);
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Gender;

    fn isolate(id: &str, mar: f64) -> Isolate {
        Isolate::new(id, "Urine", Gender::Female, false, false, mar)
    }

    #[test]
    fn test_vocabulary_first_appearance() {
        let ds = Dataset::new(vec![
            isolate("1", 0.1).with_result("CIP", Call::S).with_result("AMP", Call::R),
            isolate("2", 0.1).with_result("GEN", Call::I).with_result("AMP", Call::S),
        ])
        .unwrap();

        assert_eq!(ds.antibiotics(), &["CIP", "AMP", "GEN"]);
        assert_eq!(ds.call(0, 1), Some(Call::R));
        assert_eq!(ds.call(0, 2), None);
        assert_eq!(ds.call(1, 2), Some(Call::I));
    }

    #[test]
    fn test_mar_index_out_of_range_rejected() {
        let err = Dataset::new(vec![isolate("1", 0.5), isolate("2", 1.2)]).unwrap_err();
        match err {
            AmrError::InvalidMarIndex { row, id, .. } => {
                assert_eq!(row, 2);
                assert_eq!(id, "2");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(Dataset::new(vec![isolate("1", -0.01)]).is_err());
        assert!(Dataset::new(vec![isolate("1", f64::NAN)]).is_err());
        assert!(Dataset::new(vec![isolate("1", 0.0), isolate("2", 1.0)]).is_ok());
    }

    #[test]
    fn test_duplicate_antibiotic_rejected() {
        let err = Dataset::new(vec![isolate("1", 0.1)
            .with_result("AMP", Call::R)
            .with_result("AMP", Call::S)])
        .unwrap_err();
        assert!(matches!(err, AmrError::DuplicateAntibiotic { .. }));
    }

    #[test]
    fn test_explicit_vocabulary_keeps_untested_columns() {
        let ds = Dataset::with_antibiotics(
            vec!["AMP".into(), "MEM".into()],
            vec![isolate("1", 0.1).with_result("AMP", Call::R)],
        )
        .unwrap();
        assert_eq!(ds.n_antibiotics(), 2);
        assert_eq!(ds.call(0, 1), None);

        let err = Dataset::with_antibiotics(
            vec!["AMP".into()],
            vec![isolate("1", 0.1).with_result("CIP", Call::R)],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_duplicate_ids_stay_distinct() {
        let ds = Dataset::new(vec![isolate("7", 0.1), isolate("7", 0.3)]).unwrap();
        assert_eq!(ds.n_isolates(), 2);
    }

    #[test]
    fn test_resistant_antibiotics_in_vocabulary_order() {
        let ds = Dataset::new(vec![
            isolate("1", 0.1).with_result("AMP", Call::S).with_result("CIP", Call::R),
            isolate("2", 0.5)
                .with_result("CIP", Call::R)
                .with_result("AMP", Call::R)
                .with_result("GEN", Call::I),
        ])
        .unwrap();
        assert_eq!(ds.resistant_antibiotics(1), vec!["AMP", "CIP"]);
        assert_eq!(ds.resistant_columns(1), vec![0, 1]);
        assert_eq!(ds.n_resistant(0), 1);
    }

    #[test]
    fn test_filter_levels() {
        let ds = Dataset::new(vec![
            Isolate::new("1", "Urine", Gender::Female, false, false, 0.1),
            Isolate::new("2", "BLOOD", Gender::Male, false, false, 0.1),
            Isolate::new("3", "urine", Gender::parse("U"), false, false, 0.1),
        ])
        .unwrap();
        assert_eq!(ds.genders(), vec!["F", "M", "U"]);
        assert_eq!(ds.sample_types(), vec!["BLOOD", "Urine"]);
    }
}
