use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("yt-dlp is not installed. Please install it using: pip install yt-dlp")]
    ToolMissing,

    #[error("{details}")]
    ToolFailed { code: Option<i32>, details: String },

    #[error("could not parse video metadata: {0}")]
    MetadataParse(#[from] serde_json::Error),

    #[error("download finished but no MP3 file appeared in {}", .dir.display())]
    NoOutput { dir: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
