use crate::error::{Result, SignError};
use crate::frame::FrameImage;
use crate::label::LetterLabel;
use crate::label::LetterLabel::{D, I, K, M, N, R, S, T, U};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Labels of the 27-way primary classifier, in its output order.
pub const PRIMARY_LABELS: [LetterLabel; 27] = LetterLabel::ALL;
/// Labels of the D/R/U specialist, in its output order.
pub const DRU_LABELS: [LetterLabel; 3] = [D, R, U];
/// Labels of the D/I/K/T specialist, in its output order.
pub const DIKT_LABELS: [LetterLabel; 4] = [D, I, K, T];
/// Labels of the M/N/S specialist, in its output order.
pub const MNS_LABELS: [LetterLabel; 3] = [M, N, S];

/// The four slots of the classifier ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifierRole {
    Primary,
    Dru,
    Dikt,
    Mns,
}

impl ClassifierRole {
    pub const ALL: [ClassifierRole; 4] = [
        ClassifierRole::Primary,
        ClassifierRole::Dru,
        ClassifierRole::Dikt,
        ClassifierRole::Mns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClassifierRole::Primary => "primary",
            ClassifierRole::Dru => "dru",
            ClassifierRole::Dikt => "dikt",
            ClassifierRole::Mns => "mns",
        }
    }

    /// The label set a classifier in this slot must produce, in output order.
    pub fn labels(self) -> &'static [LetterLabel] {
        match self {
            ClassifierRole::Primary => &PRIMARY_LABELS,
            ClassifierRole::Dru => &DRU_LABELS,
            ClassifierRole::Dikt => &DIKT_LABELS,
            ClassifierRole::Mns => &MNS_LABELS,
        }
    }
}

impl fmt::Display for ClassifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-label ranking scores produced by one classifier for one frame.
///
/// Scores are relative: they are compared, never assumed to sum to 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityVector {
    entries: Vec<(LetterLabel, f32)>,
}

impl ProbabilityVector {
    pub fn new(entries: Vec<(LetterLabel, f32)>) -> Self {
        Self { entries }
    }

    /// Pairs raw model output with the label order it was trained on.
    ///
    /// Returns `None` when the lengths differ.
    pub fn from_scores(labels: &[LetterLabel], scores: &[f32]) -> Option<Self> {
        if labels.len() != scores.len() {
            return None;
        }
        Some(Self {
            entries: labels.iter().copied().zip(scores.iter().copied()).collect(),
        })
    }

    pub fn entries(&self) -> &[(LetterLabel, f32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = LetterLabel> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    pub fn score(&self, label: LetterLabel) -> Option<f32> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, score)| *score)
    }

    /// Highest-scoring label. NaN never wins.
    ///
    /// Ties go to the label that comes first in canonical order (`Blank`, then
    /// `A`..`Z`), whatever order the classifier emitted its entries in.
    pub fn best(&self) -> Option<LetterLabel> {
        let mut best: Option<(LetterLabel, f32)> = None;
        for &(label, score) in &self.entries {
            if score.is_nan() {
                continue;
            }
            let wins = |(top_label, top): (LetterLabel, f32)| {
                score > top || (score == top && label < top_label)
            };
            if best.is_none_or(wins) {
                best = Some((label, score));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Whether the vector covers exactly `expected` (order-insensitive, no duplicates).
    pub fn covers_exactly(&self, expected: &[LetterLabel]) -> bool {
        let ours: BTreeSet<LetterLabel> = self.labels().collect();
        let theirs: BTreeSet<LetterLabel> = expected.iter().copied().collect();
        ours.len() == self.entries.len() && ours == theirs
    }
}

/// Trait for a frame classifier.
///
/// This trait allows swapping implementations (real model runtime vs mock).
pub trait Classifier: Send + Sync {
    /// Score a preprocessed frame over this classifier's label set.
    fn classify(&self, image: &FrameImage) -> Result<ProbabilityVector>;

    /// Labels this classifier scores, in output order.
    fn labels(&self) -> &[LetterLabel];

    /// Get the name of the loaded model
    fn name(&self) -> &str;

    /// Check if the classifier is ready
    fn is_ready(&self) -> bool {
        true
    }
}

/// Implement Classifier for Arc<T> to allow sharing across processors.
impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    fn classify(&self, image: &FrameImage) -> Result<ProbabilityVector> {
        (**self).classify(image)
    }

    fn labels(&self) -> &[LetterLabel] {
        (**self).labels()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock classifier for testing
#[derive(Debug)]
pub struct MockClassifier {
    name: String,
    labels: Vec<LetterLabel>,
    scores: Vec<f32>,
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Create a mock over `labels` that scores every label 0.0.
    pub fn new(name: &str, labels: &[LetterLabel]) -> Self {
        Self {
            name: name.to_string(),
            labels: labels.to_vec(),
            scores: vec![0.0; labels.len()],
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock for one of the ensemble slots, with that slot's label set.
    pub fn for_role(role: ClassifierRole) -> Self {
        Self::new(role.name(), role.labels())
    }

    /// Configure the raw scores returned (one per label, in label order)
    pub fn with_scores(mut self, scores: &[f32]) -> Self {
        self.scores = scores.to_vec();
        self
    }

    /// Configure the mock so `label` scores 1.0 and everything else 0.0
    pub fn with_top(mut self, label: LetterLabel) -> Self {
        self.scores = self
            .labels
            .iter()
            .map(|l| if *l == label { 1.0 } else { 0.0 })
            .collect();
        self
    }

    /// Configure the mock to fail on classify
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of times `classify` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _image: &FrameImage) -> Result<ProbabilityVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(SignError::ClassifierUnavailable {
                classifier: self.name.clone(),
                message: "mock classifier failure".to_string(),
            });
        }
        // A deliberately mismatched score count yields an empty vector, which
        // the ensemble reports as unavailable.
        Ok(ProbabilityVector::from_scores(&self.labels, &self.scores).unwrap_or_default())
    }

    fn labels(&self) -> &[LetterLabel] {
        &self.labels
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
