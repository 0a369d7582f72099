//! Recorded classifier output, replayed without any models.
//!
//! JSON Lines, one object per frame:
//!
//! ```text
//! {"t_ms": 0, "primary": [27 floats], "dru": [3], "dikt": [4], "mns": [3]}
//! ```
//!
//! `primary` is in canonical order (blank, A..Z); the specialist arrays follow
//! their group order. `t_ms` is the offset from the start of the recording and
//! must not decrease. Blank lines and `#` comments are skipped.

use crate::classify::{ClassifierRole, EnsembleScores};
use crate::error::{Result, SignError};
use crate::pipeline::clock::{Clock, SystemClock};
use crate::pipeline::source::{FramePayload, FrameSource, SourcePoll, TimedFrame};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub t_ms: u64,
    pub primary: Vec<f32>,
    pub dru: Vec<f32>,
    pub dikt: Vec<f32>,
    pub mns: Vec<f32>,
}

impl ScoreRecord {
    /// Records `scores` at offset `t_ms`. Labels missing from a vector are written as 0.0.
    pub fn from_scores(t_ms: u64, scores: &EnsembleScores) -> Self {
        let raw = |role: ClassifierRole| -> Vec<f32> {
            let vector = scores.get(role);
            role.labels()
                .iter()
                .map(|label| vector.score(*label).unwrap_or_default())
                .collect()
        };
        Self {
            t_ms,
            primary: raw(ClassifierRole::Primary),
            dru: raw(ClassifierRole::Dru),
            dikt: raw(ClassifierRole::Dikt),
            mns: raw(ClassifierRole::Mns),
        }
    }

    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.t_ms)
    }

    pub fn to_scores(&self) -> Result<EnsembleScores> {
        EnsembleScores::from_raw(&self.primary, &self.dru, &self.dikt, &self.mns)
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SignError::Other(e.to_string()))
    }
}

/// Parses one line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ScoreRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| SignError::Replay {
            line: line_no,
            message: e.to_string(),
        })
}

/// Reads a whole recording, checking every record and the time order.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ScoreRecord>> {
    let mut records: Vec<ScoreRecord> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let Some(record) = parse_line(&line?, line_no)? else {
            continue;
        };

        record.to_scores().map_err(|e| SignError::Replay {
            line: line_no,
            message: e.to_string(),
        })?;
        if let Some(previous) = records.last()
            && record.t_ms < previous.t_ms
        {
            return Err(SignError::Replay {
                line: line_no,
                message: format!("t_ms {} goes back from {}", record.t_ms, previous.t_ms),
            });
        }
        records.push(record);
    }
    Ok(records)
}

/// Reads a recording from a file.
pub fn load(path: &Path) -> Result<Vec<ScoreRecord>> {
    let file = File::open(path)?;
    read_records(BufReader::new(file))
}

/// Replays recorded scores as a [`FrameSource`].
///
/// In batch mode every record is available at once and stamped with
/// `start + t_ms`. In realtime mode a record stays `Pending` until the clock
/// reaches its offset.
pub struct ReplaySource<C: Clock = SystemClock> {
    frames: VecDeque<(Duration, EnsembleScores)>,
    start: Instant,
    realtime: bool,
    clock: C,
}

impl ReplaySource<SystemClock> {
    pub fn new(records: &[ScoreRecord], start: Instant) -> Result<Self> {
        let frames = records
            .iter()
            .map(|record| Ok((record.offset(), record.to_scores()?)))
            .collect::<Result<VecDeque<_>>>()?;
        Ok(Self {
            frames,
            start,
            realtime: false,
            clock: SystemClock,
        })
    }
}

impl<C: Clock> ReplaySource<C> {
    /// Pace frames by their recorded offsets.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> ReplaySource<C2> {
        ReplaySource {
            frames: self.frames,
            start: self.start,
            realtime: self.realtime,
            clock,
        }
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl<C: Clock> FrameSource for ReplaySource<C> {
    fn next_frame(&mut self) -> Result<SourcePoll> {
        let Some((offset, _)) = self.frames.front() else {
            return Ok(SourcePoll::Exhausted);
        };
        let at = self.start + *offset;
        if self.realtime && self.clock.now() < at {
            return Ok(SourcePoll::Pending);
        }
        match self.frames.pop_front() {
            Some((_, scores)) => Ok(SourcePoll::Frame(TimedFrame::at(
                FramePayload::Scores(scores),
                at,
            ))),
            None => Ok(SourcePoll::Exhausted),
        }
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LetterLabel::{self, A, D, U};
    use crate::pipeline::clock::ManualClock;
    use crate::resolve::Resolver;
    use std::io::Cursor;

    fn record(t_ms: u64, top: LetterLabel) -> ScoreRecord {
        let mut primary = vec![0.0; 27];
        primary[top.index()] = 1.0;
        ScoreRecord {
            t_ms,
            primary,
            dru: vec![0.1, 0.2, 0.7],
            dikt: vec![0.0; 4],
            mns: vec![0.0; 3],
        }
    }

    fn jsonl(records: &[ScoreRecord]) -> String {
        records
            .iter()
            .map(|r| r.to_json_line().unwrap() + "\n")
            .collect()
    }

    #[test]
    fn test_reads_records_skipping_comments() {
        let text = format!(
            "# recorded session\n\n{}",
            jsonl(&[record(0, A), record(10, D)])
        );
        let records = read_records(Cursor::new(text)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].t_ms, 10);

        let resolver = Resolver::new().unwrap();
        let label = resolver.resolve(&records[1].to_scores().unwrap()).unwrap().label;
        assert_eq!(label, U);
    }

    #[test]
    fn test_bad_json_reports_line() {
        let text = format!("{}\n{{\"t_ms\": 5}}\n", record(0, A).to_json_line().unwrap());
        match read_records(Cursor::new(text)) {
            Err(SignError::Replay { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("missing field"));
            }
            other => panic!("Expected Replay error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_vector_length_reports_line() {
        let mut bad = record(0, A);
        bad.dikt = vec![0.0; 3];
        match read_records(Cursor::new(jsonl(&[bad]))) {
            Err(SignError::Replay { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("expected 4 scores, got 3"));
            }
            other => panic!("Expected Replay error, got {:?}", other),
        }
    }

    #[test]
    fn test_time_must_not_go_back() {
        let text = jsonl(&[record(20, A), record(20, A), record(10, A)]);
        match read_records(Cursor::new(text)) {
            Err(SignError::Replay { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected Replay error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_scores_matches_raw_layout() {
        let original = record(40, D);
        let scores = original.to_scores().unwrap();
        assert_eq!(ScoreRecord::from_scores(40, &scores), original);
    }

    #[test]
    fn test_batch_source_stamps_offsets() {
        let start = Instant::now();
        let mut source = ReplaySource::new(&[record(0, A), record(250, D)], start).unwrap();
        assert_eq!(source.name(), "replay");

        let mut stamps = Vec::new();
        while let SourcePoll::Frame(frame) = source.next_frame().unwrap() {
            stamps.push(frame.captured_at.unwrap());
        }
        assert_eq!(stamps, vec![start, start + Duration::from_millis(250)]);
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Exhausted);
    }

    #[test]
    fn test_realtime_source_waits_for_clock() {
        let start = Instant::now();
        let clock = ManualClock::new(start);
        let mut source = ReplaySource::new(&[record(0, A), record(100, A)], start)
            .unwrap()
            .realtime(true)
            .with_clock(clock.clone());

        assert!(matches!(source.next_frame().unwrap(), SourcePoll::Frame(_)));
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Pending);

        clock.advance(Duration::from_millis(99));
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Pending);

        clock.advance(Duration::from_millis(1));
        assert!(matches!(source.next_frame().unwrap(), SourcePoll::Frame(_)));
        assert_eq!(source.next_frame().unwrap(), SourcePoll::Exhausted);
    }
}
