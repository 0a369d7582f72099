//! Single entry point that takes one frame from payload to display state.

use crate::classify::{ClassifierEnsemble, EnsembleScores};
use crate::error::{Result, SignError};
use crate::frame::{FrameImage, FrameShape};
use crate::label::LetterLabel;
use crate::pipeline::source::FramePayload;
use crate::pipeline::types::{DisplayState, FrameReport, SessionStats};
use crate::resolve::Resolver;
use crate::segment::{SegmentationState, Segmenter, SegmenterConfig};
use std::time::Instant;

/// Owns the resolver and the segmentation state; mutated once per frame.
#[derive(Debug)]
pub struct FrameProcessor {
    ensemble: Option<ClassifierEnsemble>,
    resolver: Resolver,
    segmenter: Segmenter,
    frame_shape: FrameShape,
    current_symbol: Option<LetterLabel>,
    stats: SessionStats,
}

impl FrameProcessor {
    /// Processor for precomputed scores only (no classifiers attached).
    pub fn new(resolver: Resolver, config: SegmenterConfig, start: Instant) -> Self {
        Self {
            ensemble: None,
            resolver,
            segmenter: Segmenter::new(config, start),
            frame_shape: FrameShape::default(),
            current_symbol: None,
            stats: SessionStats::default(),
        }
    }

    /// Attach the classifier ensemble used for image frames.
    pub fn with_ensemble(mut self, ensemble: ClassifierEnsemble) -> Self {
        self.ensemble = Some(ensemble);
        self
    }

    /// Shape image frames must have.
    pub fn with_frame_shape(mut self, shape: FrameShape) -> Self {
        self.frame_shape = shape;
        self
    }

    pub fn state(&self) -> &SegmentationState {
        self.segmenter.state()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn display(&self) -> DisplayState {
        DisplayState::from_state(self.current_symbol, self.segmenter.state())
    }

    /// Back to the startup state. Session counters are kept.
    pub fn reset(&mut self, now: Instant) {
        self.segmenter.reset(now);
        self.current_symbol = None;
    }

    /// Processes one frame of either kind.
    pub fn process(&mut self, payload: &FramePayload, now: Instant) -> Result<FrameReport> {
        match payload {
            FramePayload::Image(image) => self.process_image(image, now),
            FramePayload::Scores(scores) => self.process_scores(scores, now),
        }
    }

    /// Validates, classifies, resolves and segments one preprocessed frame.
    ///
    /// On error the segmentation state is untouched and the frame counts as skipped.
    pub fn process_image(&mut self, image: &FrameImage, now: Instant) -> Result<FrameReport> {
        let scores = self.classify(image);
        match scores {
            Ok(scores) => self.process_scores(&scores, now),
            Err(e) => {
                self.stats.skipped += 1;
                Err(e)
            }
        }
    }

    fn classify(&self, image: &FrameImage) -> Result<EnsembleScores> {
        image.ensure_shape(self.frame_shape)?;
        let ensemble = self
            .ensemble
            .as_ref()
            .ok_or_else(|| SignError::ClassifierUnavailable {
                classifier: "ensemble".to_string(),
                message: "no classifier ensemble attached".to_string(),
            })?;
        ensemble.classify(image)
    }

    /// Resolves and segments one frame of precomputed scores.
    pub fn process_scores(&mut self, scores: &EnsembleScores, now: Instant) -> Result<FrameReport> {
        let resolution = match scores.validate().and_then(|()| self.resolver.resolve(scores)) {
            Ok(resolution) => resolution,
            Err(e) => {
                self.stats.skipped += 1;
                return Err(e);
            }
        };

        self.current_symbol = Some(resolution.label);
        let event = self.segmenter.step(resolution.label, now);
        self.stats.record(&event);

        Ok(FrameReport {
            resolution,
            event,
            display: self.display(),
        })
    }
}
