//! Replay application entry point.
//!
//! Orchestrates the recorded-scores flow:
//! read recording → resolve → segment → display

use crate::classify::{Classifier, ClassifierEnsemble};
use crate::config::{Config, OutputFormat};
use crate::error::{Result, SignError};
use crate::output::{render_closing, render_summary};
use crate::pipeline::driver::{Driver, DriverConfig, DriverSummary};
use crate::pipeline::error::{ErrorReporter, LogReporter, SilentReporter};
use crate::pipeline::processor::FrameProcessor;
use crate::pipeline::sink::{DisplaySink, JsonSink, StdoutSink};
use crate::replay::{self, ReplaySource, ScoreRecord};
use crate::resolve::Resolver;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Command-line overrides for a replay run.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub realtime: bool,
    /// Force JSON output regardless of config
    pub json: bool,
    pub confirm_hold: Option<Duration>,
    pub flush_blank: Option<Duration>,
    pub quiet: bool,
    /// 0=letters and words, 1=plus session summary, 2=plus hold progress
    pub verbosity: u8,
}

/// Reads a recording from `input`, or stdin when `input` is `-`.
pub fn load_recording(input: &Path) -> Result<Vec<ScoreRecord>> {
    if input.as_os_str() == "-" {
        replay::read_records(io::stdin().lock())
    } else {
        replay::load(input)
    }
}

/// Builds the frame processor from config plus CLI overrides.
pub fn build_processor(
    config: &Config,
    options: &ReplayOptions,
    start: Instant,
) -> Result<FrameProcessor> {
    let mut segmenter = config.segmenter_config();
    if let Some(hold) = options.confirm_hold {
        segmenter.confirm_hold = hold;
    }
    if let Some(blank) = options.flush_blank {
        segmenter.flush_blank = blank;
    }
    if segmenter.confirm_hold.is_zero() || segmenter.flush_blank.is_zero() {
        return Err(SignError::ConfigInvalidValue {
            key: "timing".to_string(),
            message: "durations must be greater than zero".to_string(),
        });
    }

    Ok(FrameProcessor::new(Resolver::new()?, segmenter, start)
        .with_frame_shape(config.frame_shape()))
}

/// Assembles the classifier ensemble with the configured fan-out mode.
pub fn build_ensemble(
    config: &Config,
    primary: Arc<dyn Classifier>,
    dru: Arc<dyn Classifier>,
    dikt: Arc<dyn Classifier>,
    mns: Arc<dyn Classifier>,
) -> Result<ClassifierEnsemble> {
    Ok(ClassifierEnsemble::new(primary, dru, dikt, mns)?
        .with_parallel(config.parallel_classifiers()))
}

pub fn build_sink(config: &Config, options: &ReplayOptions) -> Box<dyn DisplaySink> {
    if options.json || config.output.format == OutputFormat::Json {
        Box::new(JsonSink::new())
    } else {
        Box::new(StdoutSink::new(config.output.show_symbol))
    }
}

/// Run the replay command until the recording ends or Ctrl+C.
///
/// The driver runs on a blocking task; Ctrl+C sends it the stop signal and
/// waits for the summary.
pub async fn run_replay(
    config: Config,
    records: Vec<ScoreRecord>,
    options: ReplayOptions,
) -> Result<DriverSummary> {
    config.validate()?;

    let start = Instant::now();
    let source = ReplaySource::new(&records, start)?.realtime(options.realtime);
    let processor = build_processor(&config, &options, start)?;
    let sink = build_sink(&config, &options);
    let reporter: Arc<dyn ErrorReporter> = if options.quiet {
        Arc::new(SilentReporter)
    } else {
        Arc::new(LogReporter)
    };

    let driver = Driver::new(source, processor, sink)
        .with_error_reporter(reporter)
        .with_config(DriverConfig {
            tick: config.tick(),
            quiet: options.quiet,
            verbosity: options.verbosity,
        });

    let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
    let realtime = options.realtime;
    let mut task = tokio::task::spawn_blocking(move || {
        if realtime {
            driver.run(&stop_rx)
        } else {
            driver.run_unpaced(&stop_rx)
        }
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| SignError::Other(format!("Failed to wait for Ctrl+C: {}", e)))?;
            stop_tx.send(()).ok();
            task.await
        }
    };
    let summary = joined.map_err(|e| SignError::Other(format!("Driver task failed: {}", e)))??;

    if !options.quiet {
        render_closing();
        if options.verbosity >= 1 {
            render_summary(&summary.stats);
        }
    }
    Ok(summary)
}
