/// Convenience result type used across turnabout.
pub type TurnaboutResult<T> = Result<T, TurnaboutError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TurnaboutError {
    /// A sprite, font or sound could not be found or decoded. The asset bundle is broken.
    #[error("asset error: {0}")]
    Asset(String),

    /// Invalid script, catalog or engine input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Video and audio timelines disagree on frame counts.
    #[error("timing error: {0}")]
    Timing(String),

    /// Errors while encoding frames or audio with `ffmpeg`.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TurnaboutError {
    /// Build a [`TurnaboutError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`TurnaboutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TurnaboutError::Timing`] value.
    pub fn timing(msg: impl Into<String>) -> Self {
        Self::Timing(msg.into())
    }

    /// Build a [`TurnaboutError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TurnaboutError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
