//! Isolate records and their closed value sets.

use serde::{Deserialize, Serialize};

/// A susceptibility call for one antibiotic on one isolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Call {
    /// Susceptible.
    S,
    /// Intermediate (includes susceptible dose-dependent).
    I,
    /// Resistant.
    R,
}

impl Call {
    /// Parse a non-blank call code. `SDD` is folded into `I`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns `None` for anything outside S, I, R, SDD.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "S" => Some(Self::S),
            "I" | "SDD" => Some(Self::I),
            "R" => Some(Self::R),
            _ => None,
        }
    }

    /// Single-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::I => "I",
            Self::R => "R",
        }
    }

    /// Descriptive label used in long-format exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::S => "Sensitive",
            Self::I => "Intermediate",
            Self::R => "Resistant",
        }
    }

    /// Numeric resistance score: S = 0.0, I = 0.5, R = 1.0.
    pub fn score(&self) -> f64 {
        match self {
            Self::S => 0.0,
            Self::I => 0.5,
            Self::R => 1.0,
        }
    }

    #[inline]
    pub fn is_resistant(&self) -> bool {
        matches!(self, Self::R)
    }
}

/// Patient gender as recorded on the isolate.
///
/// Values other than M/F are kept verbatim as their own category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    /// Parse a raw gender value. "M"/"F" match case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// The stored value used for filtering and display.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a YES/NO field, case-insensitively. Anything else is `None`.
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "YES" => Some(true),
        "NO" => Some(false),
        _ => None,
    }
}

/// One clinical isolate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isolate {
    /// Sample identifier. Not required to be unique.
    pub id: String,
    /// Specimen type exactly as entered.
    pub sample_type: String,
    pub gender: Gender,
    /// ESBL producer flag.
    pub esbl: bool,
    /// Multidrug-resistant flag.
    pub mdr: bool,
    /// Multiple antibiotic resistance index in [0, 1].
    pub mar_index: f64,
    /// Recorded calls in entry order. Untested antibiotics are absent.
    pub results: Vec<(String, Call)>,
}

impl Isolate {
    /// Create an isolate with no susceptibility results.
    pub fn new(
        id: impl Into<String>,
        sample_type: impl Into<String>,
        gender: Gender,
        esbl: bool,
        mdr: bool,
        mar_index: f64,
    ) -> Self {
        Self {
            id: id.into(),
            sample_type: sample_type.into(),
            gender,
            esbl,
            mdr,
            mar_index,
            results: Vec::new(),
        }
    }

    /// Add a susceptibility call.
    pub fn with_result(mut self, antibiotic: impl Into<String>, call: Call) -> Self {
        self.results.push((antibiotic.into(), call));
        self
    }

    /// Look up the call for an antibiotic, `None` if untested.
    pub fn call(&self, antibiotic: &str) -> Option<Call> {
        self.results
            .iter()
            .find(|(name, _)| name == antibiotic)
            .map(|(_, call)| *call)
    }

    /// Case-insensitive grouping key for the sample type.
    pub fn sample_type_key(&self) -> String {
        normalize_sample_type(&self.sample_type)
    }
}

pub(crate) fn normalize_sample_type(raw: &str) -> String {
    raw.trim().to_uppercase()
}
