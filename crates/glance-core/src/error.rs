use std::path::PathBuf;

/// Fatal: the byte stream cannot be segmented into records at all
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Unknown dictionary format: {0}")]
    UnknownFormat(String),

    #[error("Malformed {format} document: {reason}")]
    MalformedDocument {
        format: &'static str,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Recoverable: the caller falls back to an empty preview
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to read dictionary source: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
