//! Animation error types

use thiserror::Error;

/// Errors raised while building or configuring animations
#[derive(Error, Debug)]
pub enum AnimationError {
    /// Tween durations must be finite and strictly positive
    #[error("Invalid duration: {0}ms")]
    InvalidDuration(f64),

    /// Delays must be finite and non-negative
    #[error("Invalid delay: {0}ms")]
    InvalidDelay(f64),

    /// Strict easing lookup failed
    #[error("Unknown easing: {0}")]
    UnknownEasing(String),

    /// The target has no readable current value to start from
    #[error("Target value cannot be read")]
    UnreadableTarget,

    /// Failed to parse manager configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value is out of range
    #[error("Invalid configuration: {field} = {value}")]
    ConfigValue { field: &'static str, value: f64 },
}

/// Why a write into a settable target was skipped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    /// The target was dropped by its owner
    #[error("target has been dropped")]
    Dropped,

    /// The target is borrowed elsewhere for the duration of this frame
    #[error("target is already borrowed")]
    Busy,
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
