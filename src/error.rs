// error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the plotter can surface. All of them are fatal for a run.
#[derive(Debug, Error)]
pub(crate) enum PlotError {
    #[error("Usage: {program} <input_prefix> <name_table> <output_prefix>")]
    Usage { program: String },

    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Malformed input in {}: {detail}", path.display())]
    MalformedInput { path: PathBuf, detail: String },

    #[error("Table {} has no column named '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Eigenvalues sum to zero; variance explained is undefined.")]
    DivisionByZero,

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Failed to write output file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlotError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, detail: impl AsRef<str>) -> Self {
        PlotError::MalformedInput {
            path: path.into(),
            detail: format!("line {}: {}", line, detail.as_ref()),
        }
    }
}
