pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use csv::{export_csv, write_report};
pub use json::export_json;
