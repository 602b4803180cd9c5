//! Gender and sample-type filtering.

use crate::data::{Dataset, Isolate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentinel meaning "no restriction" on a filter dimension.
pub const ALL: &str = "ALL";

/// A user-selected restriction on the dataset.
///
/// Both dimensions are optional; `None` or `"ALL"` leaves a dimension
/// unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// Exact match against the stored gender value.
    #[serde(default)]
    pub gender: Option<String>,
    /// Case-insensitive match against the sample type.
    #[serde(default)]
    pub sample_type: Option<String>,
}

impl FilterRequest {
    /// A request with no restrictions.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn sample_type(mut self, sample_type: impl Into<String>) -> Self {
        self.sample_type = Some(sample_type.into());
        self
    }

    /// Check whether neither dimension restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        active(&self.gender).is_none() && active(&self.sample_type).is_none()
    }

    /// Check whether an isolate passes both predicates.
    pub fn matches(&self, isolate: &Isolate) -> bool {
        let gender_ok = active(&self.gender).map_or(true, |g| isolate.gender.as_str() == g);
        let sample_ok = active(&self.sample_type)
            .map_or(true, |s| isolate.sample_type.trim().to_uppercase() == s.trim().to_uppercase());
        gender_ok && sample_ok
    }
}

impl std::fmt::Display for FilterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gender={}, sample_type={}",
            active(&self.gender).unwrap_or(ALL),
            active(&self.sample_type).unwrap_or(ALL)
        )
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().eq_ignore_ascii_case(ALL))
}

/// Apply a filter request, returning a new dataset.
///
/// Isolate order and the full antibiotic vocabulary are preserved; an
/// antibiotic no remaining isolate was tested against keeps its column.
/// An empty result is valid.
pub fn filter_dataset(dataset: &Dataset, request: &FilterRequest) -> Dataset {
    if request.is_unrestricted() {
        return dataset.clone();
    }

    let isolates = dataset.isolates();
    let keep: Vec<usize> = (0..dataset.n_isolates())
        .into_par_iter()
        .filter(|&row| request.matches(&isolates[row]))
        .collect();

    debug!(
        filter = %request,
        kept = keep.len(),
        total = dataset.n_isolates(),
        "filtered isolates"
    );
    dataset.subset_rows(&keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Call, Gender};

    fn create_test_dataset() -> Dataset {
        Dataset::new(vec![
            Isolate::new("1", "Urine", Gender::Female, true, true, 0.5).with_result("AMP", Call::R),
            Isolate::new("2", "BLOOD", Gender::Male, false, false, 0.1).with_result("AMP", Call::S),
            Isolate::new("3", "urine", Gender::Male, false, true, 0.3)
                .with_result("AMP", Call::I)
                .with_result("CIP", Call::R),
            Isolate::new("4", "Pus", Gender::parse("U"), false, false, 0.0),
        ])
        .unwrap()
    }

    fn ids(ds: &Dataset) -> Vec<&str> {
        ds.isolates().iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_unrestricted_is_identity() {
        let ds = create_test_dataset();
        assert_eq!(filter_dataset(&ds, &FilterRequest::all()), ds);

        let explicit_all = FilterRequest::all().gender("ALL").sample_type("all");
        assert_eq!(filter_dataset(&ds, &explicit_all), ds);
    }

    #[test]
    fn test_gender_filter_exact() {
        let ds = create_test_dataset();
        let filtered = filter_dataset(&ds, &FilterRequest::all().gender("M"));
        assert_eq!(ids(&filtered), vec!["2", "3"]);

        let other = filter_dataset(&ds, &FilterRequest::all().gender("U"));
        assert_eq!(ids(&other), vec!["4"]);
    }

    #[test]
    fn test_sample_type_case_insensitive() {
        let ds = create_test_dataset();
        let filtered = filter_dataset(&ds, &FilterRequest::all().sample_type("URINE"));
        assert_eq!(ids(&filtered), vec!["1", "3"]);
        // Original casing preserved
        assert_eq!(filtered.isolates()[0].sample_type, "Urine");
        assert_eq!(filtered.isolates()[1].sample_type, "urine");
    }

    #[test]
    fn test_vocabulary_preserved() {
        let ds = create_test_dataset();
        let filtered = filter_dataset(&ds, &FilterRequest::all().sample_type("blood"));
        assert_eq!(filtered.antibiotics(), &["AMP", "CIP"]);
        assert_eq!(filtered.call(0, 1), None);
    }

    #[test]
    fn test_empty_result() {
        let ds = create_test_dataset();
        let filtered = filter_dataset(&ds, &FilterRequest::all().gender("F").sample_type("Blood"));
        assert!(filtered.is_empty());
        assert_eq!(filtered.n_antibiotics(), 2);
        // Source untouched
        assert_eq!(ds.n_isolates(), 4);
    }
}
