//! Per-frame error classification and reporting.

use crate::error::SignError;
use crate::output::render_frame_error;
use std::fmt;

/// Outcome class of a frame that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The frame is skipped; the loop goes on with the next one.
    Recoverable(String),
    /// The driver must stop.
    Fatal(String),
}

impl From<&SignError> for FrameError {
    fn from(error: &SignError) -> Self {
        if error.is_recoverable() {
            FrameError::Recoverable(error.to_string())
        } else {
            FrameError::Fatal(error.to_string())
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            FrameError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

/// Trait for reporting frame errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error raised while handling a frame.
    fn report(&self, stage: &str, error: &FrameError);
}

/// Reporter that writes warnings to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &FrameError) {
        render_frame_error(stage, error);
    }
}

/// Reporter that drops everything (quiet mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ErrorReporter for SilentReporter {
    fn report(&self, _stage: &str, _error: &FrameError) {}
}
