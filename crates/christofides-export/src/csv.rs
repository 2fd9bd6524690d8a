//! CSV run log serializer.
//!
//! One row per timed run, with the columns
//! `Sample,Algorithm,VertsAmount,ExecutionTime,Path,Cost,Expected,Delta`.
//! Fields containing a comma, a double quote, or a line break are quoted
//! per RFC 4180. Execution time is written in fractional seconds.
//! Missing expected costs (and therefore deltas) are left empty.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;
use std::time::Duration;

use christofides_pipeline::Tour;

use crate::path::format_path;

/// Header line of the run log, without the trailing newline.
pub const CSV_HEADER: &str = "Sample,Algorithm,VertsAmount,ExecutionTime,Path,Cost,Expected,Delta";

/// One timed run of one strategy on one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Sample file name.
    pub sample: String,
    /// Strategy label, e.g. `christofides`.
    pub algorithm: String,
    /// Number of vertices in the sample's matrix.
    pub vertex_count: usize,
    /// Wall time of the tour construction alone.
    pub execution_time: Duration,
    /// The tour the strategy produced, rendered in the `Path` column.
    pub tour: Tour,
    /// Cost of the closed tour.
    pub cost: f64,
    /// Known optimal cost, if the sample carries one.
    pub expected: Option<f64>,
    /// `cost - expected`, when `expected` is known.
    pub delta: Option<f64>,
}

impl RunRecord {
    /// `cost / expected`, when `expected` is known and non-zero.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        self.expected
            .filter(|&e| e != 0.0)
            .map(|e| self.cost / e)
    }
}

/// Quote a field if it contains a separator, a quote, or a line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

/// Serialize run records into CSV text, header first.
///
/// Every line, including the last, ends with `\n`.
#[must_use]
pub fn to_csv(records: &[RunRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{CSV_HEADER}");
    for record in records {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            escape_field(&record.sample),
            escape_field(&record.algorithm),
            record.vertex_count,
            record.execution_time.as_secs_f64(),
            escape_field(&format_path(&record.tour)),
            record.cost,
            optional(record.expected),
            optional(record.delta),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record() -> RunRecord {
        RunRecord {
            sample: "tsp4_4.txt".to_string(),
            algorithm: "christofides".to_string(),
            vertex_count: 4,
            execution_time: Duration::from_millis(250),
            tour: Tour::new(vec![0, 3, 2, 1]),
            cost: 4.0,
            expected: Some(4.0),
            delta: Some(0.0),
        }
    }

    #[test]
    fn header_only_for_no_records() {
        assert_eq!(to_csv(&[]), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn row_layout() {
        let csv = to_csv(&[record()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                CSV_HEADER,
                "tsp4_4.txt,christofides,4,0.25,0 -> 3 -> 2 -> 1 -> 0,4,4,0",
            ]
        );
    }

    #[test]
    fn missing_expected_leaves_fields_empty() {
        let r = RunRecord {
            sample: "random12.txt".to_string(),
            expected: None,
            delta: None,
            cost: 12.5,
            ..record()
        };
        let csv = to_csv(&[r]);
        assert!(csv.ends_with(",12.5,,\n"), "{csv}");
    }

    #[test]
    fn quotes_fields_with_separators() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn ratio_needs_nonzero_expected() {
        let mut r = record();
        r.cost = 6.0;
        assert_eq!(r.ratio(), Some(1.5));
        r.expected = Some(0.0);
        assert_eq!(r.ratio(), None);
        r.expected = None;
        assert_eq!(r.ratio(), None);
    }
}
