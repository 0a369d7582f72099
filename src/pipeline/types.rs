//! Data passed between the processor, the driver and the display sink.

use crate::defaults;
use crate::label::LetterLabel;
use crate::resolve::Resolution;
use crate::segment::{SegmentEvent, SegmentationState};
use serde::{Deserialize, Serialize};

/// The three strings shown to the user after each frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Best guess for the latest frame (pre-confirmation), `blank`, or `Empty`
    /// before the first frame.
    pub current_symbol: String,
    /// Last completed word; empty until the first flush.
    pub current_word: String,
    /// All completed words, each followed by one space.
    pub sentence: String,
}

impl DisplayState {
    pub fn from_state(symbol: Option<LetterLabel>, state: &SegmentationState) -> Self {
        Self {
            current_symbol: symbol
                .map(|s| s.to_string())
                .unwrap_or_else(|| defaults::EMPTY_SYMBOL.to_string()),
            current_word: state.current_word().to_string(),
            sentence: state.sentence().to_string(),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            current_symbol: defaults::EMPTY_SYMBOL.to_string(),
            current_word: String::new(),
            sentence: String::new(),
        }
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub resolution: Resolution,
    pub event: SegmentEvent,
    pub display: DisplayState,
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Frames that went through resolution and segmentation.
    pub frames: u64,
    /// Frames rejected before reaching the state machine.
    pub skipped: u64,
    /// Letters confirmed.
    pub letters: u64,
    /// Words flushed.
    pub words: u64,
}

impl SessionStats {
    pub fn record(&mut self, event: &SegmentEvent) {
        self.frames += 1;
        match event {
            SegmentEvent::Confirmed(_) => self.letters += 1,
            SegmentEvent::WordCompleted(_) => self.words += 1,
            SegmentEvent::Idle | SegmentEvent::Holding { .. } => {}
        }
    }
}
