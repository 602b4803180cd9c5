//! Analysis composition and execution.

mod runner;

pub use runner::{Analysis, AnalysisConfig, SurveillanceReport};
