//! Export-ready tables built from a dataset and its derived fields.

mod long;
mod table;

pub use long::long_format;
pub use table::{assemble, ExportTable};
