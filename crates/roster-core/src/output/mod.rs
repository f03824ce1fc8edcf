//! Output formatters for snapshots and tabular exports

pub mod csv;
pub mod json;

pub use csv::{Table, Tabular};
pub use json::to_json;
