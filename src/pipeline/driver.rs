//! Tick-driven loop: pull one frame, process it, show the result.
//!
//! Every tick handles at most one frame, fully, before yielding. The
//! segmentation state therefore only ever sees one mutation per completed
//! frame, even when the ensemble classifies on several threads.

use crate::defaults;
use crate::error::Result;
use crate::output::render_event;
use crate::pipeline::clock::{Clock, SystemClock};
use crate::pipeline::error::{ErrorReporter, FrameError, LogReporter};
use crate::pipeline::processor::FrameProcessor;
use crate::pipeline::sink::DisplaySink;
use crate::pipeline::source::{FrameSource, SourcePoll};
use crate::pipeline::types::{DisplayState, FrameReport, SessionStats};
use crossbeam_channel::{Receiver, TryRecvError, select, tick};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Configuration for the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Cadence of the loop.
    pub tick: Duration,
    /// Suppress diagnostic output.
    pub quiet: bool,
    /// 0: letters and words, 1: plus warnings detail, 2: plus hold progress.
    pub verbosity: u8,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(defaults::TICK_MS),
            quiet: false,
            verbosity: 0,
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Processed(FrameReport),
    /// A frame was rejected and reported; the loop continues.
    Skipped,
    Pending,
    Exhausted,
}

/// Final state handed back when the loop ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSummary {
    pub stats: SessionStats,
    pub display: DisplayState,
    /// Whatever the sink returned from `finish()`.
    pub sentence: Option<String>,
}

/// Drives a [`FrameProcessor`] from a [`FrameSource`] into a [`DisplaySink`].
pub struct Driver<S: FrameSource, C: Clock = SystemClock> {
    source: S,
    processor: FrameProcessor,
    sink: Box<dyn DisplaySink>,
    clock: C,
    error_reporter: Arc<dyn ErrorReporter>,
    config: DriverConfig,
}

impl<S: FrameSource> Driver<S, SystemClock> {
    pub fn new(source: S, processor: FrameProcessor, sink: Box<dyn DisplaySink>) -> Self {
        Self {
            source,
            processor,
            sink,
            clock: SystemClock,
            error_reporter: Arc::new(LogReporter),
            config: DriverConfig::default(),
        }
    }
}

impl<S: FrameSource, C: Clock> Driver<S, C> {
    /// Replaces the clock used for frames without a capture time.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Driver<S, C2> {
        Driver {
            source: self.source,
            processor: self.processor,
            sink: self.sink,
            clock,
            error_reporter: self.error_reporter,
            config: self.config,
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    /// Polls the source once and processes at most one frame.
    ///
    /// Recoverable failures are reported and turn into `Skipped`; anything
    /// else (such as a broken sink) is returned.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let frame = match self.source.next_frame() {
            Ok(SourcePoll::Frame(frame)) => frame,
            Ok(SourcePoll::Pending) => return Ok(TickOutcome::Pending),
            Ok(SourcePoll::Exhausted) => return Ok(TickOutcome::Exhausted),
            Err(e) => return self.skip_or_fail(self.source.name(), e),
        };

        let now = frame.captured_at.unwrap_or_else(|| self.clock.now());
        let report = match self.processor.process(&frame.payload, now) {
            Ok(report) => report,
            Err(e) => return self.skip_or_fail("processor", e),
        };

        if !self.config.quiet {
            render_event(&report.event, self.config.verbosity);
        }
        if let Err(e) = self.sink.update(&report.display) {
            self.error_reporter
                .report(self.sink.name(), &FrameError::from(&e));
            return Err(e);
        }
        Ok(TickOutcome::Processed(report))
    }

    fn skip_or_fail(&self, stage: &str, error: crate::error::SignError) -> Result<TickOutcome> {
        let frame_error = FrameError::from(&error);
        self.error_reporter.report(stage, &frame_error);
        match frame_error {
            FrameError::Recoverable(_) => Ok(TickOutcome::Skipped),
            FrameError::Fatal(_) => Err(error),
        }
    }

    /// Runs on the configured cadence until `stop` fires (or its sender is
    /// dropped) or the source is exhausted.
    pub fn run(mut self, stop: &Receiver<()>) -> Result<DriverSummary> {
        let ticker = tick(self.config.tick);
        loop {
            select! {
                recv(stop) -> _ => break,
                recv(ticker) -> _ => {
                    if self.tick()? == TickOutcome::Exhausted {
                        break;
                    }
                }
            }
        }
        Ok(self.finish())
    }

    /// Runs without pacing until the source is exhausted.
    ///
    /// Meant for sources that stamp their own capture times (recordings).
    pub fn run_to_end(self) -> Result<DriverSummary> {
        self.run_unpaced(&crossbeam_channel::never())
    }

    /// Like [`run_to_end`](Self::run_to_end), but also stops when `stop`
    /// fires or its sender is dropped. A `Pending` poll waits one tick.
    pub fn run_unpaced(mut self, stop: &Receiver<()>) -> Result<DriverSummary> {
        loop {
            if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }
            match self.tick()? {
                TickOutcome::Exhausted => break,
                TickOutcome::Pending => thread::sleep(self.config.tick),
                TickOutcome::Processed(_) | TickOutcome::Skipped => {}
            }
        }
        Ok(self.finish())
    }

    fn finish(mut self) -> DriverSummary {
        DriverSummary {
            stats: self.processor.stats(),
            display: self.processor.display(),
            sentence: self.sink.finish(),
        }
    }
}
