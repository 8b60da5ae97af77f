use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("No file name given")]
    MissingFileName,
    #[error("Unsupported image format '{0}'. Use PNG or JPG.")]
    UnsupportedFormat(String),
    #[error("Could not read or write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HighlightError>;
