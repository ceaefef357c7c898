/// Convenience result type used across lottiebind.
pub type LottieResult<T> = Result<T, LottieError>;

/// Error taxonomy for engine, session, and playback APIs.
///
/// Session draw paths never surface these to callers; they log and degrade to no-ops.
#[derive(thiserror::Error, Debug)]
pub enum LottieError {
    /// The process-wide rendering engine could not be initialized.
    #[error("engine init error: {0}")]
    EngineInit(String),

    /// The engine has no loader for the declared format tag.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The animation bytes could not be parsed into an animation resource.
    #[error("load error: {0}")]
    Load(String),

    /// A render target binding was rejected (bad size, short buffer).
    #[error("target error: {0}")]
    Target(String),

    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LottieError {
    /// Build a [`LottieError::EngineInit`] value.
    pub fn engine_init(msg: impl Into<String>) -> Self {
        Self::EngineInit(msg.into())
    }

    /// Build a [`LottieError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`LottieError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`LottieError::Target`] value.
    pub fn target(msg: impl Into<String>) -> Self {
        Self::Target(msg.into())
    }

    /// Build a [`LottieError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
