//! Data structures for AMR surveillance analysis.

mod dataset;
mod isolate;
mod loader;

pub use dataset::Dataset;
pub use isolate::{parse_yes_no, Call, Gender, Isolate};
pub use loader::{standardize_header, LoadOptions, REQUIRED_COLUMNS};
