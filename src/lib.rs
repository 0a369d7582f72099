//! signscribe - Fingerspelling to text
//!
//! Resolves per-frame output of a four-classifier ensemble into one letter,
//! then turns the letter stream into confirmed letters, words and a sentence.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod frame;
pub mod label;
pub mod output;
pub mod pipeline;
pub mod replay;
pub mod resolve;
pub mod segment;

// Core traits (source → process → sink)
pub use classify::{Classifier, ClassifierEnsemble, EnsembleScores, ProbabilityVector};
pub use pipeline::clock::Clock;
pub use pipeline::sink::{CollectorSink, DisplaySink, JsonSink, StdoutSink};
pub use pipeline::source::FrameSource;

// Resolution and segmentation
pub use label::LetterLabel;
pub use resolve::{Resolution, Resolver};
pub use segment::{SegmentEvent, SegmentationState, Segmenter, SegmenterConfig};

// Pipeline
pub use pipeline::driver::{Driver, DriverConfig, DriverSummary};
pub use pipeline::processor::FrameProcessor;
pub use pipeline::types::{DisplayState, SessionStats};

// Error handling
pub use error::{Result, SignError};

// Config
pub use config::Config;

// Frame error reporting
pub use pipeline::error::{ErrorReporter, FrameError};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
