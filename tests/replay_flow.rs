use signscribe::classify::ClassifierRole;
use signscribe::error::SignError;
use signscribe::label::LetterLabel::{self, Blank, D, I, K, M, N, T};
use signscribe::pipeline::driver::{Driver, DriverConfig};
use signscribe::pipeline::error::SilentReporter;
use signscribe::pipeline::processor::FrameProcessor;
use signscribe::pipeline::sink::{CollectorSink, JsonSink};
use signscribe::pipeline::types::DisplayState;
use signscribe::replay::{ReplaySource, ScoreRecord, read_records};
use signscribe::resolve::Resolver;
use signscribe::segment::SegmenterConfig;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Primary votes `primary`; every specialist votes `specialist` if it scores it.
fn record(t_ms: u64, primary: LetterLabel, specialist: LetterLabel) -> ScoreRecord {
    let raw = |role: ClassifierRole, top: LetterLabel| -> Vec<f32> {
        role.labels()
            .iter()
            .map(|l| if *l == top { 3.0 } else { -1.0 })
            .collect()
    };
    ScoreRecord {
        t_ms,
        primary: raw(ClassifierRole::Primary, primary),
        dru: raw(ClassifierRole::Dru, specialist),
        dikt: raw(ClassifierRole::Dikt, specialist),
        mns: raw(ClassifierRole::Mns, specialist),
    }
}

/// `primary` every 10ms over `[from, to]`, with specialists voting `specialist`.
fn segment(from: u64, to: u64, primary: LetterLabel, specialist: LetterLabel) -> Vec<ScoreRecord> {
    (from..=to)
        .step_by(10)
        .map(|t| record(t, primary, specialist))
        .collect()
}

fn recording() -> String {
    // Primary mistakes both letters for confusable neighbours; the specialists correct them.
    let mut records = segment(0, 1000, K, I);
    records.extend(segment(1010, 2010, M, N));
    records.extend(segment(2020, 4100, Blank, Blank));

    let mut text = String::from("# two letters then a pause\n");
    for r in &records {
        text.push_str(&r.to_json_line().unwrap());
        text.push('\n');
    }
    text
}

fn quiet() -> DriverConfig {
    DriverConfig {
        quiet: true,
        ..DriverConfig::default()
    }
}

#[test]
fn test_replay_recording_through_driver() {
    let records = read_records(Cursor::new(recording())).unwrap();
    let start = Instant::now();
    let collector = CollectorSink::new();

    let summary = Driver::new(
        ReplaySource::new(&records, start).unwrap(),
        FrameProcessor::new(Resolver::new().unwrap(), SegmenterConfig::default(), start),
        Box::new(collector.clone()),
    )
    .with_config(quiet())
    .run_to_end()
    .unwrap();

    assert_eq!(summary.sentence, Some("IN".to_string()));
    assert_eq!(summary.display.sentence, "IN ");
    assert_eq!(summary.stats.letters, 2);
    assert_eq!(summary.stats.words, 1);
    assert_eq!(summary.stats.frames as usize, records.len());
    assert_eq!(collector.history().len(), records.len());

    let first = &collector.history()[0];
    assert_eq!(first.current_symbol, "I");
    assert_eq!(first.current_word, "");
}

#[test]
fn test_d_recording_follows_dru_specialist() {
    let records = segment(0, 1000, D, T);
    let start = Instant::now();

    let collector = CollectorSink::new();
    let summary = Driver::new(
        ReplaySource::new(&records, start).unwrap(),
        FrameProcessor::new(Resolver::new().unwrap(), SegmenterConfig::default(), start),
        Box::new(collector.clone()),
    )
    .with_config(quiet())
    .run_to_end()
    .unwrap();

    // DRU cannot score T and falls back to its first label; DIKT's T vote is never consulted.
    assert_eq!(collector.last().unwrap().current_symbol, "D");
    assert_eq!(summary.stats.letters, 1);
}

#[test]
fn test_malformed_recording_names_line() {
    let mut text = recording();
    text.push_str("{\"t_ms\": 9000, \"primary\": [1.0]}\n");
    let bad_line = text.lines().count();

    match read_records(Cursor::new(text)) {
        Err(SignError::Replay { line, .. }) => assert_eq!(line, bad_line),
        other => panic!("Expected Replay error, got {:?}", other.map(|r| r.len())),
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_json_output_is_parseable() {
    let records = read_records(Cursor::new(recording())).unwrap();
    let start = Instant::now();
    let buf = SharedBuf::default();

    Driver::new(
        ReplaySource::new(&records, start).unwrap(),
        FrameProcessor::new(Resolver::new().unwrap(), SegmenterConfig::default(), start),
        Box::new(JsonSink::with_writer(Box::new(buf.clone()))),
    )
    .with_error_reporter(Arc::new(SilentReporter))
    .with_config(quiet())
    .run_to_end()
    .unwrap();

    let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    let states: Vec<DisplayState> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(!states.is_empty());
    assert_eq!(states.last().unwrap().sentence, "IN ");
    assert!(states.iter().any(|s| s.current_symbol == "N"));
}
