//! The four-classifier ensemble behind the disambiguation resolver.
//!
//! Every frame is scored by the 27-way primary classifier and by the three
//! specialists. The resolver decides afterwards which vector to trust, so all
//! four always run. They are independent pure functions of the same image, so
//! they may run in parallel without changing the result.

use crate::classify::classifier::{Classifier, ClassifierRole, ProbabilityVector};
use crate::error::{Result, SignError};
use crate::frame::FrameImage;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

/// The four score vectors for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleScores {
    pub primary: ProbabilityVector,
    pub dru: ProbabilityVector,
    pub dikt: ProbabilityVector,
    pub mns: ProbabilityVector,
}

impl EnsembleScores {
    /// Builds the four vectors from raw model output in each role's label order.
    pub fn from_raw(primary: &[f32], dru: &[f32], dikt: &[f32], mns: &[f32]) -> Result<Self> {
        let scores = Self {
            primary: raw_vector(ClassifierRole::Primary, primary)?,
            dru: raw_vector(ClassifierRole::Dru, dru)?,
            dikt: raw_vector(ClassifierRole::Dikt, dikt)?,
            mns: raw_vector(ClassifierRole::Mns, mns)?,
        };
        scores.validate()?;
        Ok(scores)
    }

    pub fn get(&self, role: ClassifierRole) -> &ProbabilityVector {
        match role {
            ClassifierRole::Primary => &self.primary,
            ClassifierRole::Dru => &self.dru,
            ClassifierRole::Dikt => &self.dikt,
            ClassifierRole::Mns => &self.mns,
        }
    }

    /// Checks every vector is usable for resolution.
    pub fn validate(&self) -> Result<()> {
        for role in ClassifierRole::ALL {
            check_output(role, role.name(), self.get(role))?;
        }
        Ok(())
    }
}

fn raw_vector(role: ClassifierRole, scores: &[f32]) -> Result<ProbabilityVector> {
    ProbabilityVector::from_scores(role.labels(), scores).ok_or_else(|| {
        SignError::ClassifierUnavailable {
            classifier: role.name().to_string(),
            message: format!(
                "expected {} scores, got {}",
                role.labels().len(),
                scores.len()
            ),
        }
    })
}

/// An output is usable when it is non-empty, covers exactly the role's labels
/// and every score is finite.
fn check_output(role: ClassifierRole, name: &str, vector: &ProbabilityVector) -> Result<()> {
    let unavailable = |message: String| SignError::ClassifierUnavailable {
        classifier: name.to_string(),
        message,
    };

    if vector.is_empty() {
        return Err(unavailable("empty score vector".to_string()));
    }
    if !vector.covers_exactly(role.labels()) {
        return Err(unavailable(format!(
            "expected scores for {} labels of the {} set, got {}",
            role.labels().len(),
            role,
            vector.len()
        )));
    }
    if let Some((label, score)) = vector.entries().iter().find(|(_, s)| !s.is_finite()) {
        return Err(unavailable(format!(
            "non-finite score {} for {}",
            score, label
        )));
    }
    Ok(())
}

/// Primary classifier plus the three specialist disambiguators.
pub struct ClassifierEnsemble {
    primary: Arc<dyn Classifier>,
    dru: Arc<dyn Classifier>,
    dikt: Arc<dyn Classifier>,
    mns: Arc<dyn Classifier>,
    parallel: bool,
    name: String,
}

impl ClassifierEnsemble {
    /// Assembles the ensemble, checking each classifier declares its slot's label set.
    ///
    /// A mismatch is a startup configuration error, not a per-frame one.
    pub fn new(
        primary: Arc<dyn Classifier>,
        dru: Arc<dyn Classifier>,
        dikt: Arc<dyn Classifier>,
        mns: Arc<dyn Classifier>,
    ) -> Result<Self> {
        let name = [&primary, &dru, &dikt, &mns]
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join("+");
        let ensemble = Self {
            name,
            primary,
            dru,
            dikt,
            mns,
            parallel: false,
        };
        for role in ClassifierRole::ALL {
            let classifier = ensemble.slot(role);
            let declared: BTreeSet<_> = classifier.labels().iter().copied().collect();
            let required: BTreeSet<_> = role.labels().iter().copied().collect();
            if declared.len() != classifier.labels().len() || declared != required {
                return Err(SignError::LabelSetConfig {
                    message: format!(
                        "classifier '{}' in the {} slot declares {:?}, expected {:?}",
                        classifier.name(),
                        role,
                        classifier.labels(),
                        role.labels()
                    ),
                });
            }
        }
        Ok(ensemble)
    }

    /// Run the four classifiers on scoped threads instead of one after another.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        ClassifierRole::ALL
            .iter()
            .all(|role| self.slot(*role).is_ready())
    }

    fn slot(&self, role: ClassifierRole) -> &Arc<dyn Classifier> {
        match role {
            ClassifierRole::Primary => &self.primary,
            ClassifierRole::Dru => &self.dru,
            ClassifierRole::Dikt => &self.dikt,
            ClassifierRole::Mns => &self.mns,
        }
    }

    /// Scores one frame with all four classifiers.
    ///
    /// Any failed, empty or malformed output makes the whole frame undecidable.
    pub fn classify(&self, image: &FrameImage) -> Result<EnsembleScores> {
        let [primary, dru, dikt, mns] = if self.parallel {
            self.classify_parallel(image)
        } else {
            ClassifierRole::ALL.map(|role| self.classify_one(role, image))
        };
        Ok(EnsembleScores {
            primary: primary?,
            dru: dru?,
            dikt: dikt?,
            mns: mns?,
        })
    }

    fn classify_one(&self, role: ClassifierRole, image: &FrameImage) -> Result<ProbabilityVector> {
        let classifier = self.slot(role);
        let vector = classifier.classify(image)?;
        check_output(role, classifier.name(), &vector)?;
        Ok(vector)
    }

    fn classify_parallel(&self, image: &FrameImage) -> [Result<ProbabilityVector>; 4] {
        thread::scope(|scope| {
            let handles =
                ClassifierRole::ALL.map(|role| scope.spawn(move || self.classify_one(role, image)));
            let mut roles = ClassifierRole::ALL.into_iter();
            handles.map(|handle| {
                let role = roles.next().unwrap_or(ClassifierRole::Primary);
                handle.join().unwrap_or_else(|_| {
                    Err(SignError::ClassifierUnavailable {
                        classifier: self.slot(role).name().to_string(),
                        message: "classifier thread panicked".to_string(),
                    })
                })
            })
        })
    }
}

impl std::fmt::Debug for ClassifierEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierEnsemble")
            .field("name", &self.name)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}
