//! Display sinks for the character, word and sentence strings.

use crate::error::{Result, SignError};
use crate::output::format_display_line;
use crate::pipeline::types::DisplayState;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Pluggable presentation layer.
/// Receives the display state after every processed frame.
pub trait DisplaySink: Send + 'static {
    /// Handle the current display state. Called once per processed frame.
    fn update(&mut self, display: &DisplayState) -> Result<()>;

    /// Called on shutdown. Return the final sentence if applicable.
    fn finish(&mut self) -> Option<String> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

fn final_sentence(last: &Option<DisplayState>) -> Option<String> {
    last.as_ref()
        .map(|d| d.sentence.trim_end().to_string())
        .filter(|s| !s.is_empty())
}

fn write_failed(e: io::Error) -> SignError {
    SignError::Sink {
        message: e.to_string(),
    }
}

/// Text sink: writes a line whenever something visible changes.
pub struct StdoutSink {
    writer: Box<dyn Write + Send>,
    show_symbol: bool,
    last: Option<DisplayState>,
}

impl StdoutSink {
    pub fn new(show_symbol: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), show_symbol)
    }

    pub fn with_writer(writer: Box<dyn Write + Send>, show_symbol: bool) -> Self {
        Self {
            writer,
            show_symbol,
            last: None,
        }
    }
}

impl DisplaySink for StdoutSink {
    fn update(&mut self, display: &DisplayState) -> Result<()> {
        let (symbol_changed, text_changed) = match &self.last {
            None => (true, !display.sentence.is_empty()),
            Some(last) => (
                last.current_symbol != display.current_symbol,
                last.sentence != display.sentence || last.current_word != display.current_word,
            ),
        };

        if text_changed || (self.show_symbol && symbol_changed) {
            writeln!(self.writer, "{}", format_display_line(display)).map_err(write_failed)?;
            self.writer.flush().map_err(write_failed)?;
        }
        self.last = Some(display.clone());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        final_sentence(&self.last)
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// JSON Lines sink: one object per visible change.
pub struct JsonSink {
    writer: Box<dyn Write + Send>,
    last: Option<DisplayState>,
}

impl JsonSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer, last: None }
    }
}

impl Default for JsonSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for JsonSink {
    fn update(&mut self, display: &DisplayState) -> Result<()> {
        if self.last.as_ref() == Some(display) {
            return Ok(());
        }
        let line = serde_json::to_string(display).map_err(|e| SignError::Sink {
            message: e.to_string(),
        })?;
        writeln!(self.writer, "{}", line).map_err(write_failed)?;
        self.writer.flush().map_err(write_failed)?;
        self.last = Some(display.clone());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        final_sentence(&self.last)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// In-memory sink that keeps every update. Clones share the history.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    history: Arc<Mutex<Vec<DisplayState>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<DisplayState> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<DisplayState> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl DisplaySink for CollectorSink {
    fn update(&mut self, display: &DisplayState) -> Result<()> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(display.clone());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        final_sentence(&self.last())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
