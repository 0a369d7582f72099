//! Shared rendering for terminal output.
//!
//! Display lines go to stdout through a sink; everything diagnostic goes to
//! stderr from here.

use crate::label::LetterLabel;
use crate::pipeline::error::FrameError;
use crate::pipeline::types::{DisplayState, SessionStats};
use crate::segment::SegmentEvent;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Clear the current terminal line
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// One plain-text line for the three display fields.
pub fn format_display_line(display: &DisplayState) -> String {
    format!(
        "Character: {} | Word: {} | Sentence: {}",
        display.current_symbol,
        display.current_word,
        display.sentence.trim_end()
    )
}

/// Diagnostic line for a segmentation event, or `None` when it is not shown
/// at this verbosity.
///
/// Confirmed letters and completed words are always shown; hold progress
/// needs `-vv`.
pub fn format_event(event: &SegmentEvent, verbosity: u8) -> Option<String> {
    match event {
        SegmentEvent::Confirmed(letter) => {
            Some(format!("Detected Letter: {letter}").green().to_string())
        }
        SegmentEvent::WordCompleted(word) => {
            Some(format!("Detected Word: {word}").bold().to_string())
        }
        SegmentEvent::Holding { symbol, held } if verbosity >= 2 => Some(
            format!("holding {symbol} {}ms", held.as_millis())
                .dimmed()
                .to_string(),
        ),
        SegmentEvent::Holding { .. } | SegmentEvent::Idle => None,
    }
}

/// Render a segmentation event to stderr.
pub fn render_event(event: &SegmentEvent, verbosity: u8) {
    if let Some(line) = format_event(event, verbosity) {
        clear_line();
        eprintln!("{line}");
    }
}

/// Render a per-frame error to stderr.
pub fn render_frame_error(stage: &str, error: &FrameError) {
    clear_line();
    match error {
        FrameError::Recoverable(msg) => {
            eprintln!("{}", format!("[{stage}] skipped frame: {msg}").yellow())
        }
        FrameError::Fatal(msg) => eprintln!("{}", format!("[{stage}] {msg}").red()),
    }
}

pub fn format_summary(stats: &SessionStats) -> String {
    format!(
        "{} frames ({} skipped), {} letters, {} words",
        stats.frames, stats.skipped, stats.letters, stats.words
    )
}

/// Render end-of-session counters to stderr.
pub fn render_summary(stats: &SessionStats) {
    eprintln!("{}", format_summary(stats).dimmed());
}

pub fn render_closing() {
    clear_line();
    eprintln!("Closing App");
    io::stderr().flush().ok();
}

/// One row of the `labels` listing: label, primary index and routing group.
pub fn format_label_row(label: LetterLabel, group: Option<&str>) -> String {
    format!("{:>2}  {:<5} {}", label.index(), label.as_str(), group.unwrap_or("-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LetterLabel::{Blank, D, H};
    use std::time::Duration;

    #[test]
    fn test_display_line_trims_sentence() {
        let display = DisplayState {
            current_symbol: "H".to_string(),
            current_word: "HI".to_string(),
            sentence: "HI ".to_string(),
        };
        assert_eq!(
            format_display_line(&display),
            "Character: H | Word: HI | Sentence: HI"
        );
    }

    #[test]
    fn test_display_line_at_startup() {
        assert_eq!(
            format_display_line(&DisplayState::default()),
            "Character: Empty | Word:  | Sentence: "
        );
    }

    #[test]
    fn test_letters_and_words_always_shown() {
        let letter = format_event(&SegmentEvent::Confirmed(H), 0).unwrap();
        assert!(letter.contains("Detected Letter: H"));

        let word = format_event(&SegmentEvent::WordCompleted("HI".to_string()), 0).unwrap();
        assert!(word.contains("Detected Word: HI"));
    }

    #[test]
    fn test_holding_needs_verbosity() {
        let holding = SegmentEvent::Holding {
            symbol: D,
            held: Duration::from_millis(420),
        };
        assert_eq!(format_event(&holding, 0), None);
        assert_eq!(format_event(&holding, 1), None);
        assert!(format_event(&holding, 2).unwrap().contains("holding D 420ms"));
        assert_eq!(format_event(&SegmentEvent::Idle, 3), None);
    }

    #[test]
    fn test_summary() {
        let stats = SessionStats {
            frames: 120,
            skipped: 2,
            letters: 3,
            words: 1,
        };
        assert_eq!(
            format_summary(&stats),
            "120 frames (2 skipped), 3 letters, 1 words"
        );
    }

    #[test]
    fn test_label_row() {
        assert_eq!(format_label_row(Blank, None), " 0  blank -");
        assert_eq!(format_label_row(D, Some("DRU")), " 4  D     DRU");
    }
}
