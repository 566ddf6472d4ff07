use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported extension '{ext}' for {}", path.display())]
    UnsupportedExtension { ext: String, path: PathBuf },

    #[error("{tool} is required to process {} but was not found in PATH", path.display())]
    ToolMissing { tool: &'static str, path: PathBuf },

    #[error("{tool} failed for {}: {detail}", path.display())]
    ToolFailed {
        tool: &'static str,
        path: PathBuf,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
