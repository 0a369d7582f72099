//! Classifier ensemble adapter.
//!
//! The models themselves are opaque: anything that maps a frame to a score
//! vector over its label set can sit behind the [`Classifier`] trait.

pub mod classifier;
pub mod ensemble;

pub use classifier::{
    Classifier, ClassifierRole, DIKT_LABELS, DRU_LABELS, MNS_LABELS, MockClassifier,
    PRIMARY_LABELS, ProbabilityVector,
};
pub use ensemble::{ClassifierEnsemble, EnsembleScores};
