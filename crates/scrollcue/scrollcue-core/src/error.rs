//! Error types for scrollcue registration and configuration.
//!
//! Only registration paths return errors. Frame and event paths absorb
//! missing elements and timing races as no-ops.

use serde::{Deserialize, Serialize};

/// Configuration errors raised when a target is registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScrollcueError {
    /// Target handle is empty
    #[error("Missing target handle")]
    MissingTarget,

    /// Target is already registered for the same kind of effect
    #[error("Target already registered: {target}")]
    DuplicateTarget { target: String },

    /// Counter target value is negative or not finite
    #[error("Invalid counter target value: {value}")]
    InvalidCounterValue { value: f64 },

    /// Duration is zero, negative or not finite
    #[error("Invalid duration: {duration_ms} ms")]
    InvalidDuration { duration_ms: f64 },

    /// Only zero or one decimal place can be rendered
    #[error("Invalid decimal precision: {decimals} (expected 0 or 1)")]
    InvalidDecimals { decimals: u32 },

    /// Visibility threshold outside (0, 1]
    #[error("Invalid visibility threshold: {threshold}")]
    InvalidThreshold { threshold: f64 },

    /// Reveal delay is negative or not finite
    #[error("Invalid delay: {delay_seconds} s")]
    InvalidDelay { delay_seconds: f64 },

    /// A numeric option that must be finite was not
    #[error("Invalid value for {field}: {value}")]
    InvalidNumber { field: String, value: f64 },

    /// Parallax binding whose template cannot read its signal source
    #[error("Invalid parallax binding: {reason}")]
    InvalidBinding { reason: String },

    /// Carousel declared without slides
    #[error("Carousel {container} has no slides")]
    EmptyCarousel { container: String },

    /// Carousel dot indicators do not match the slide count
    #[error("Carousel has {slides} slides but {dots} dots")]
    DotCountMismatch { slides: usize, dots: usize },

    /// Carousel start index outside the slide range
    #[error("Start index {index} out of range for {len} slides")]
    StartIndexOutOfRange { index: usize, len: usize },

    /// Carousel id not known to the page
    #[error("Carousel not found: {id}")]
    CarouselNotFound { id: u32 },

    /// Dataset attribute missing
    #[error("Missing attribute: data-{name}")]
    MissingAttribute { name: String },

    /// Dataset attribute present but malformed
    #[error("Invalid attribute data-{name}={value:?}: {reason}")]
    InvalidAttribute {
        name: String,
        value: String,
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl ScrollcueError {
    /// Build an `InvalidAttribute` error.
    pub fn attribute(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingTarget | Self::DuplicateTarget { .. } => "target",
            Self::InvalidCounterValue { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidDecimals { .. }
            | Self::InvalidThreshold { .. }
            | Self::InvalidDelay { .. }
            | Self::InvalidNumber { .. }
            | Self::InvalidBinding { .. } => "validation",
            Self::EmptyCarousel { .. }
            | Self::DotCountMismatch { .. }
            | Self::StartIndexOutOfRange { .. }
            | Self::CarouselNotFound { .. } => "carousel",
            Self::MissingAttribute { .. } | Self::InvalidAttribute { .. } => "dataset",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ScrollcueError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Require a finite value, naming the offending field.
pub(crate) fn ensure_finite(field: &str, value: f64) -> crate::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScrollcueError::InvalidNumber {
            field: field.to_string(),
            value,
        })
    }
}

/// Reject empty handles.
pub(crate) fn ensure_target(target: &str) -> crate::Result<()> {
    if target.trim().is_empty() {
        Err(ScrollcueError::MissingTarget)
    } else {
        Ok(())
    }
}
