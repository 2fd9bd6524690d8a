//! Parsing of benchmark sample files.
//!
//! A sample is a whitespace-separated square distance matrix, one row
//! per non-blank line. Its file name follows `tsp<id>_<cost>.txt`, where
//! `<cost>` is the known optimal tour cost used to grade a run.
//!
//! This module only deals with text; reading files is left to the
//! caller.

use crate::types::{AdjacencyMatrix, TourError};

/// A parsed benchmark instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// File name the sample was read from.
    pub name: String,
    /// The distance matrix.
    pub matrix: AdjacencyMatrix,
    /// Known optimal cost, if the file name carries one.
    pub expected_cost: Option<f64>,
}

impl Sample {
    /// Parse a sample from its file name and contents.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::InvalidSample`] if `text` is not a square
    /// numeric matrix.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, TourError> {
        let name = name.into();
        let matrix = parse_matrix(text).map_err(|e| match e {
            TourError::InvalidSample(msg) => TourError::InvalidSample(format!("{name}: {msg}")),
            other => other,
        })?;
        let expected_cost = expected_cost_from_file_name(&name);
        Ok(Self {
            name,
            matrix,
            expected_cost,
        })
    }

    /// Number of vertices in the sample.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.matrix.len()
    }
}

/// Parse a whitespace-separated square matrix.
///
/// Blank lines are skipped; tokens on a line may be separated by any
/// run of spaces or tabs.
///
/// # Errors
///
/// Returns [`TourError::InvalidSample`] if a token is not a number or a
/// row's length differs from the number of rows.
pub fn parse_matrix(text: &str) -> Result<AdjacencyMatrix, TourError> {
    let mut rows = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    TourError::InvalidSample(format!(
                        "line {}: `{token}` is not a number",
                        line_no + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let n = rows.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(TourError::InvalidSample(format!(
            "row {} has {} entries, expected {n}",
            i + 1,
            row.len()
        )));
    }

    AdjacencyMatrix::from_rows(rows)
}

/// Extract the expected cost from a `tsp<id>_<cost>.txt` file name.
///
/// Returns `None` for names that do not follow the pattern.
#[must_use]
pub fn expected_cost_from_file_name(name: &str) -> Option<f64> {
    let stem = name.strip_suffix(".txt")?;
    let rest = stem.strip_prefix("tsp")?;
    let (id, cost) = rest.split_once('_')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cost.parse().ok().filter(|c: &f64| c.is_finite())
}
