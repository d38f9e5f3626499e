use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("No page was created, nothing to save")]
    NoPages,

    #[error("No canvas is active")]
    NoCanvas,

    #[error("Unsupported output format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Native engine error: {0}")]
    Native(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DrawError {
    /// Wraps a native engine failure without altering it.
    pub fn native<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DrawError::Native(Box::new(err))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, DrawError::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, DrawError>;
