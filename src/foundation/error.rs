/// Result alias used across the crate.
pub type CardResult<T> = Result<T, CardError>;

/// Error type for request validation, asset loading, rendering and export.
///
/// None of these are fatal to a session: asset errors are recorded per slot and rendering degrades
/// around them. They surface as `Err` only at API boundaries.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Rejected input (unknown creature kind, bad layout values).
    #[error("validation error: {0}")]
    Validation(String),

    /// Fetch or decode failure for a single asset.
    #[error("asset error: {0}")]
    Asset(String),

    /// Surface-level failure while drawing or reading back a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Export refused because no creature is active or layers are still loading.
    #[error("not ready: {0}")]
    NotReady(String),

    /// Layout (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`CardError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CardError::NotReady`].
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`CardError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for the export-gate refusal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
