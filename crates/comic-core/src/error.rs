use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Required tool not found: {0}")]
    ToolMissing(String),

    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("No images found in {0}")]
    NoImages(PathBuf),

    #[error("No pages could be assembled for {0}")]
    NoPages(PathBuf),

    #[error("Renamed {from} to {to}, but the renamed file is missing")]
    RenameVerification { from: PathBuf, to: PathBuf },

    #[error("Cannot rename {from} to {to}: {reason}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl ConvertError {
    /// True for the interrupt outcome, which is reported differently from errors.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True when the file held nothing usable, as opposed to failing to decode.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoImages(_) | Self::NoPages(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
