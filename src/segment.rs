//! Temporal segmentation of the per-frame letter stream.
//!
//! Turns a noisy stream of resolved labels into confirmed letters, completed
//! words and a growing sentence:
//!
//! - a non-blank symbol is confirmed once it has won every frame for
//!   `confirm_hold` without interruption;
//! - confirmed letters are flushed into a word once blank frames arrive and
//!   `flush_blank` has passed since the hold timer was last reset.
//!
//! Blank and non-blank timing share a single timer. It is reset when a new
//! symbol starts a hold, when a letter is confirmed, and when a word is
//! flushed. Blank frames never reset it on their own, so blanks accumulate
//! toward the flush threshold from whenever the last letter event happened.

use crate::defaults;
use crate::label::{LetterLabel, spell};
use std::time::{Duration, Instant};

/// Timing thresholds for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Continuous hold needed to confirm a letter.
    pub confirm_hold: Duration,
    /// Time since the last timer reset needed before blanks flush a word.
    pub flush_blank: Duration,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            confirm_hold: Duration::from_millis(defaults::CONFIRM_HOLD_MS),
            flush_blank: Duration::from_millis(defaults::FLUSH_BLANK_MS),
        }
    }
}

/// Mutable segmentation state. Only [`Segmenter`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationState {
    previous_symbol: Option<LetterLabel>,
    symbol_hold_start: Instant,
    pending_letters: Vec<LetterLabel>,
    current_word: String,
    sentence: String,
}

impl SegmentationState {
    pub fn new(start: Instant) -> Self {
        Self {
            previous_symbol: None,
            symbol_hold_start: start,
            pending_letters: Vec::new(),
            current_word: String::new(),
            sentence: String::new(),
        }
    }

    /// Symbol currently being timed for confirmation; `None` right after a
    /// confirmation or at startup.
    pub fn previous_symbol(&self) -> Option<LetterLabel> {
        self.previous_symbol
    }

    pub fn symbol_hold_start(&self) -> Instant {
        self.symbol_hold_start
    }

    /// Letters confirmed since the last flush.
    pub fn pending_letters(&self) -> &[LetterLabel] {
        &self.pending_letters
    }

    /// Last flushed word; empty until the first flush.
    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    /// Every flushed word, each followed by one space.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEvent {
    /// Blank frame with nothing to flush (or not yet long enough).
    Idle,
    /// A non-blank symbol is being timed; `held` is zero when the hold just started.
    Holding { symbol: LetterLabel, held: Duration },
    /// A letter was appended to the pending letters.
    Confirmed(LetterLabel),
    /// Pending letters were flushed into a word and appended to the sentence.
    WordCompleted(String),
}

/// The segmentation state machine.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
    state: SegmentationState,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig, start: Instant) -> Self {
        Self {
            config,
            state: SegmentationState::new(start),
        }
    }

    pub fn config(&self) -> SegmenterConfig {
        self.config
    }

    pub fn state(&self) -> &SegmentationState {
        &self.state
    }

    /// Back to the startup state, with timers at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.state = SegmentationState::new(now);
    }

    /// Advances the state machine by one resolved frame.
    ///
    /// Total and infallible. A `now` earlier than the hold start counts as no
    /// elapsed time.
    pub fn step(&mut self, symbol: LetterLabel, now: Instant) -> SegmentEvent {
        let state = &mut self.state;
        let elapsed = now.saturating_duration_since(state.symbol_hold_start);

        if !symbol.is_blank() {
            if state.previous_symbol != Some(symbol) {
                state.previous_symbol = Some(symbol);
                state.symbol_hold_start = now;
                return SegmentEvent::Holding {
                    symbol,
                    held: Duration::ZERO,
                };
            }
            if elapsed >= self.config.confirm_hold {
                state.pending_letters.push(symbol);
                state.previous_symbol = None;
                state.symbol_hold_start = now;
                return SegmentEvent::Confirmed(symbol);
            }
            return SegmentEvent::Holding {
                symbol,
                held: elapsed,
            };
        }

        if elapsed >= self.config.flush_blank && !state.pending_letters.is_empty() {
            let word = spell(&state.pending_letters);
            state.sentence.push_str(&word);
            state.sentence.push(' ');
            state.current_word = word.clone();
            state.pending_letters.clear();
            state.symbol_hold_start = now;
            return SegmentEvent::WordCompleted(word);
        }

        SegmentEvent::Idle
    }
}
