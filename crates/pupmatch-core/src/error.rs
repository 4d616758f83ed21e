use thiserror::Error;

/// Errors raised by the PupMatch client-side models.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted entry could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection failed to serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An HTTP request to the backend or an image host failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Decoding or encoding image pixels failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A stored payload is not a base64 `data:` URL.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The image registry has no entry with this id.
    #[error("unknown image id: {0}")]
    UnknownImage(String),

    /// The mirror base URL does not parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// An image URL was rejected by the configured resolver.
    #[error("image URL rejected: {url} ({reason})")]
    RejectedImageUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
