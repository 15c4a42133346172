use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovriskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Coverage profile parse error at line {line}: {message}")]
    ProfileParse { line: usize, message: String },

    #[error("Coverage profile path is not a regular file: {}", .0.display())]
    ProfilePathInvalid(PathBuf),

    #[error("Failed to parse Go source: {}", .0.display())]
    SourceParse(PathBuf),

    #[error("go test failed ({status}):\n{output}")]
    Subprocess { status: ExitStatus, output: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CovriskError>;
