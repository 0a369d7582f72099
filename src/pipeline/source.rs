//! Frame sources: where the driver pulls frames from.

use crate::classify::EnsembleScores;
use crate::error::{Result, SignError};
use crate::frame::FrameImage;
use std::collections::VecDeque;
use std::time::Instant;

/// What a source hands to the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    /// A preprocessed frame; the classifier ensemble still has to score it.
    Image(FrameImage),
    /// Scores that were already computed, e.g. replayed from a recording.
    Scores(EnsembleScores),
}

/// A payload plus the time it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFrame {
    pub payload: FramePayload,
    /// Capture time; `None` means "use the driver's clock".
    pub captured_at: Option<Instant>,
}

impl TimedFrame {
    pub fn now(payload: FramePayload) -> Self {
        Self {
            payload,
            captured_at: None,
        }
    }

    pub fn at(payload: FramePayload, captured_at: Instant) -> Self {
        Self {
            payload,
            captured_at: Some(captured_at),
        }
    }
}

/// Result of polling a source once.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePoll {
    Frame(TimedFrame),
    /// Nothing new this tick.
    Pending,
    /// The source will not produce any more frames.
    Exhausted,
}

/// Trait for frame sources (camera + preprocessor, recordings).
///
/// This trait allows swapping implementations (real capture vs mock).
pub trait FrameSource: Send {
    /// Poll for the next frame. Called at most once per driver tick.
    fn next_frame(&mut self) -> Result<SourcePoll>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "source"
    }
}

/// Mock frame source for testing
#[derive(Debug, Default)]
pub struct MockFrameSource {
    polls: VecDeque<Result<SourcePoll>>,
}

impl MockFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame stamped with the driver's clock
    pub fn with_frame(mut self, payload: FramePayload) -> Self {
        self.polls
            .push_back(Ok(SourcePoll::Frame(TimedFrame::now(payload))));
        self
    }

    /// Queue a frame with an explicit capture time
    pub fn with_frame_at(mut self, payload: FramePayload, at: Instant) -> Self {
        self.polls
            .push_back(Ok(SourcePoll::Frame(TimedFrame::at(payload, at))));
        self
    }

    /// Queue an empty tick
    pub fn with_pending(mut self) -> Self {
        self.polls.push_back(Ok(SourcePoll::Pending));
        self
    }

    /// Queue a read failure
    pub fn with_failure(mut self, message: &str) -> Self {
        self.polls.push_back(Err(SignError::FrameSource {
            message: message.to_string(),
        }));
        self
    }
}

impl FrameSource for MockFrameSource {
    fn next_frame(&mut self) -> Result<SourcePoll> {
        self.polls.pop_front().unwrap_or(Ok(SourcePoll::Exhausted))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameShape;

    #[test]
    fn test_mock_source_yields_in_order_then_exhausts() {
        let image = FrameImage::filled(FrameShape::default(), 0);
        let mut source = MockFrameSource::new()
            .with_frame(FramePayload::Image(image.clone()))
            .with_pending()
            .with_failure("camera unplugged");

        assert_eq!(
            source.next_frame().unwrap(),
            SourcePoll::Frame(TimedFrame::now(FramePayload::Image(image)))
        );
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Pending);
        assert!(source.next_frame().is_err());
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Exhausted);
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Exhausted);
    }

    #[test]
    fn test_frame_source_is_object_safe() {
        let mut source: Box<dyn FrameSource> = Box::new(MockFrameSource::new());
        assert_eq!(source.name(), "mock");
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Exhausted);
    }
}
