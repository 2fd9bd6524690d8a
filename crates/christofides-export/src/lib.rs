//! christofides-export: Pure result serializers (sans-IO)
//!
//! Turns benchmark runs into text. Currently supports the CSV run log
//! and the arrow-separated path rendering used on the console.

#![warn(missing_docs)]

pub mod csv;
pub mod path;

pub use csv::{CSV_HEADER, RunRecord, to_csv};
pub use path::format_path;
