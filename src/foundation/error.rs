/// Convenience result type used across cardsmith.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by rendering and output APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Invalid user-provided options (canvas size, colors, fonts, JSON shape).
    #[error("validation error: {0}")]
    Validation(String),

    /// A gradient stop was rejected by the surface's gradient object.
    #[error("invalid gradient spec: {0}")]
    InvalidGradientSpec(String),

    /// The template image reached the blit stage without being decoded.
    #[error("missing template image: {0}")]
    MissingTemplateImage(String),

    /// Encoding the surface pixels or persisting them failed.
    #[error("encoding or io failure: {0}")]
    EncodingOrIo(String),

    /// The external compression service rejected the upload or its result.
    #[error("compression error: {0}")]
    Compression(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::InvalidGradientSpec`] value.
    pub fn invalid_gradient(msg: impl Into<String>) -> Self {
        Self::InvalidGradientSpec(msg.into())
    }

    /// Build a [`CardError::MissingTemplateImage`] value.
    pub fn missing_template(msg: impl Into<String>) -> Self {
        Self::MissingTemplateImage(msg.into())
    }

    /// Build a [`CardError::EncodingOrIo`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingOrIo(msg.into())
    }

    /// Build a [`CardError::Compression`] value.
    pub fn compression(msg: impl Into<String>) -> Self {
        Self::Compression(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
