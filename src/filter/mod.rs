//! Filtering primitives for isolate datasets.

pub mod isolates;

pub use isolates::{filter_dataset, FilterRequest};
