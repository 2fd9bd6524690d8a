use std::path::PathBuf;

use christofides_pipeline::TourError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BenchError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Tour(#[from] TourError),
    #[error("error parsing --config-json: {0}")]
    ConfigJson(serde_json::Error),
    #[error("error serializing diagnostics: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no *.txt samples in {}", .0.display())]
    NoSamples(PathBuf),
    #[error("logger init failed: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;

impl BenchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
