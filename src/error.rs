/// Convenience result type used across the padding filters.
pub type PadResult<T> = Result<T, PadError>;

/// Error taxonomy for the padding engines.
///
/// The engines themselves cannot fail on a well-formed RGBA raster; errors
/// only come from malformed input arrays or worker configuration.
#[derive(thiserror::Error, Debug)]
pub enum PadError {
    /// Invalid caller-provided raster or option.
    #[error("validation error: {0}")]
    Validation(String),

    /// The rayon worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PadError {
    /// Build a [`PadError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PadError::ThreadPool`] value.
    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }
}
