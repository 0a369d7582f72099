//! Frame-processing pipeline: source → processor → sink, paced by a driver.
//!
//! ```text
//! FrameSource ──▶ FrameProcessor ──▶ DisplaySink
//!                 (ensemble, resolver, segmenter)
//! ```

pub mod clock;
pub mod driver;
pub mod error;
pub mod processor;
pub mod sink;
pub mod source;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{Driver, DriverConfig, DriverSummary, TickOutcome};
pub use error::{ErrorReporter, FrameError, LogReporter, SilentReporter};
pub use processor::FrameProcessor;
pub use sink::{CollectorSink, DisplaySink, JsonSink, StdoutSink};
pub use source::{FramePayload, FrameSource, MockFrameSource, SourcePoll, TimedFrame};
pub use types::{DisplayState, FrameReport, SessionStats};
