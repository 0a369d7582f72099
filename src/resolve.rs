//! Disambiguation resolver.
//!
//! The primary classifier confuses a few visually similar hand shapes. Each
//! confusable subset has a specialist classifier trained only on that subset.
//! Resolution is a fixed two-level decision tree: take the primary winner, and
//! if it belongs to a confusable subset, let that subset's specialist decide.
//!
//! Subsets are checked in priority order D/R/U, then D/I/K/T, then M/N/S.
//! `D` belongs to two subsets and always routes to the D/R/U specialist.

use crate::classify::{ClassifierRole, EnsembleScores, ProbabilityVector};
use crate::error::{Result, SignError};
use crate::label::LetterLabel;
use crate::label::LetterLabel::{D, I, K, M, N, R, S, T, U};
use std::collections::BTreeSet;

/// A confusable subset and the specialist that re-resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGroup {
    pub name: &'static str,
    pub labels: &'static [LetterLabel],
    pub specialist: ClassifierRole,
}

impl LabelGroup {
    pub fn contains(&self, label: LetterLabel) -> bool {
        self.labels.contains(&label)
    }
}

/// The disambiguation table, in priority order.
pub const DISAMBIGUATION_GROUPS: [LabelGroup; 3] = [
    LabelGroup {
        name: "DRU",
        labels: &[D, R, U],
        specialist: ClassifierRole::Dru,
    },
    LabelGroup {
        name: "DIKT",
        labels: &[D, I, K, T],
        specialist: ClassifierRole::Dikt,
    },
    LabelGroup {
        name: "MNS",
        labels: &[M, N, S],
        specialist: ClassifierRole::Mns,
    },
];

/// Outcome of resolving one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Winner of the primary classifier.
    pub primary: LetterLabel,
    /// Final decision for the frame.
    pub label: LetterLabel,
    /// Group whose specialist made the final decision, if any.
    pub group: Option<&'static str>,
}

/// Combines the four ensemble vectors into one label per frame.
///
/// Stateless: the same scores always give the same label.
#[derive(Debug, Clone)]
pub struct Resolver {
    groups: Vec<LabelGroup>,
}

impl Resolver {
    /// Resolver over the fixed D/R/U, D/I/K/T, M/N/S table.
    pub fn new() -> Result<Self> {
        Self::with_groups(DISAMBIGUATION_GROUPS.to_vec())
    }

    /// Builds a resolver over `groups` (priority order), validating the table.
    ///
    /// Rejects empty groups, groups containing `Blank` or duplicate labels,
    /// specialists whose label set differs from their group, and groups that
    /// earlier groups shadow completely.
    pub fn with_groups(groups: Vec<LabelGroup>) -> Result<Self> {
        let mut claimed: BTreeSet<LetterLabel> = BTreeSet::new();
        for group in &groups {
            let invalid = |message: String| SignError::LabelSetConfig {
                message: format!("group {}: {}", group.name, message),
            };

            if group.labels.is_empty() {
                return Err(invalid("empty".to_string()));
            }
            if group.contains(LetterLabel::Blank) {
                return Err(invalid("contains blank".to_string()));
            }
            let members: BTreeSet<LetterLabel> = group.labels.iter().copied().collect();
            if members.len() != group.labels.len() {
                return Err(invalid("duplicate labels".to_string()));
            }
            if group.specialist == ClassifierRole::Primary {
                return Err(invalid("specialist cannot be the primary classifier".to_string()));
            }
            let specialist: BTreeSet<LetterLabel> =
                group.specialist.labels().iter().copied().collect();
            if specialist != members {
                return Err(invalid(format!(
                    "specialist {} scores {:?}",
                    group.specialist,
                    group.specialist.labels()
                )));
            }
            if members.is_subset(&claimed) {
                return Err(invalid(
                    "unreachable, every label routes to an earlier group".to_string(),
                ));
            }
            claimed.extend(members);
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[LabelGroup] {
        &self.groups
    }

    /// First group (in priority order) a primary winner routes to.
    pub fn route(&self, label: LetterLabel) -> Option<&LabelGroup> {
        self.groups.iter().find(|group| group.contains(label))
    }

    /// Resolves one frame.
    ///
    /// Fails only when a vector has no usable score, which ensemble validation
    /// already rules out for classifier output.
    pub fn resolve(&self, scores: &EnsembleScores) -> Result<Resolution> {
        let primary = top(ClassifierRole::Primary, &scores.primary)?;
        let Some(group) = self.route(primary) else {
            return Ok(Resolution {
                primary,
                label: primary,
                group: None,
            });
        };

        let label = top(group.specialist, scores.get(group.specialist))?;
        Ok(Resolution {
            primary,
            label,
            group: Some(group.name),
        })
    }
}

fn top(role: ClassifierRole, vector: &ProbabilityVector) -> Result<LetterLabel> {
    vector.best().ok_or_else(|| SignError::ClassifierUnavailable {
        classifier: role.name().to_string(),
        message: "no usable score".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LetterLabel::{A, B, Blank};

    fn primary_with(top: LetterLabel) -> Vec<f32> {
        let mut scores = vec![0.01; 27];
        scores[top.index()] = 0.9;
        scores
    }

    fn scores(
        primary: LetterLabel,
        dru: [f32; 3],
        dikt: [f32; 4],
        mns: [f32; 3],
    ) -> EnsembleScores {
        EnsembleScores::from_raw(&primary_with(primary), &dru, &dikt, &mns).unwrap()
    }

    #[test]
    fn test_default_table_is_valid() {
        let resolver = Resolver::new().unwrap();
        let names: Vec<_> = resolver.groups().iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["DRU", "DIKT", "MNS"]);
    }

    #[test]
    fn test_unrouted_label_keeps_primary() {
        let resolver = Resolver::new().unwrap();
        let s = scores(A, [0.9, 0.0, 0.0], [0.9, 0.0, 0.0, 0.0], [0.9, 0.0, 0.0]);
        let r = resolver.resolve(&s).unwrap();
        assert_eq!(r.label, A);
        assert_eq!(r.primary, A);
        assert_eq!(r.group, None);
    }

    #[test]
    fn test_blank_is_kept() {
        let resolver = Resolver::new().unwrap();
        let s = scores(Blank, [0.9, 0.0, 0.0], [0.9, 0.0, 0.0, 0.0], [0.9, 0.0, 0.0]);
        assert_eq!(resolver.resolve(&s).unwrap().label, Blank);
    }

    #[test]
    fn test_d_routes_to_dru_never_dikt() {
        let resolver = Resolver::new().unwrap();
        // DIKT strongly votes D, I, K, T in turn; the answer must always follow DRU.
        for dikt in [
            [9.0, 0.0, 0.0, 0.0],
            [0.0, 9.0, 0.0, 0.0],
            [0.0, 0.0, 9.0, 0.0],
            [0.0, 0.0, 0.0, 9.0],
        ] {
            let s = scores(D, [0.1, 0.2, 0.7], dikt, [0.0; 3]);
            let r = resolver.resolve(&s).unwrap();
            assert_eq!(r.label, U);
            assert_eq!(r.group, Some("DRU"));
        }
    }

    #[test]
    fn test_r_and_u_route_to_dru() {
        let resolver = Resolver::new().unwrap();
        for primary in [R, U] {
            let s = scores(primary, [0.8, 0.1, 0.1], [0.0; 4], [0.0; 3]);
            assert_eq!(resolver.resolve(&s).unwrap().label, D);
        }
    }

    #[test]
    fn test_ikt_route_to_dikt() {
        let resolver = Resolver::new().unwrap();
        for primary in [I, K, T] {
            let s = scores(primary, [0.9, 0.0, 0.0], [0.0, 0.0, 0.0, 0.5], [0.0; 3]);
            let r = resolver.resolve(&s).unwrap();
            assert_eq!(r.label, T);
            assert_eq!(r.group, Some("DIKT"));
        }
    }

    #[test]
    fn test_dikt_specialist_may_answer_d() {
        let resolver = Resolver::new().unwrap();
        let s = scores(K, [0.0, 0.9, 0.0], [0.6, 0.1, 0.2, 0.1], [0.0; 3]);
        assert_eq!(resolver.resolve(&s).unwrap().label, D);
    }

    #[test]
    fn test_mns_route_to_mns() {
        let resolver = Resolver::new().unwrap();
        for primary in [M, N, S] {
            let s = scores(primary, [0.0; 3], [0.0; 4], [0.2, 0.7, 0.1]);
            let r = resolver.resolve(&s).unwrap();
            assert_eq!(r.label, N);
            assert_eq!(r.group, Some("MNS"));
        }
    }

    #[test]
    fn test_primary_tie_breaks_by_canonical_order() {
        let resolver = Resolver::new().unwrap();
        let mut primary = vec![0.0; 27];
        primary[B.index()] = 0.5;
        primary[A.index()] = 0.5;
        let s = EnsembleScores::from_raw(&primary, &[0.0; 3], &[0.0; 4], &[0.0; 3]).unwrap();
        assert_eq!(resolver.resolve(&s).unwrap().label, A);

        let s = EnsembleScores::from_raw(&[0.0; 27], &[0.0; 3], &[0.0; 4], &[0.0; 3]).unwrap();
        assert_eq!(resolver.resolve(&s).unwrap().label, Blank);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = Resolver::new().unwrap();
        let s = scores(S, [0.3, 0.3, 0.4], [0.1, 0.2, 0.3, 0.4], [0.5, 0.5, 0.2]);
        let first = resolver.resolve(&s).unwrap();
        for _ in 0..100 {
            assert_eq!(resolver.resolve(&s).unwrap(), first);
        }
        assert_eq!(first.label, M);
    }

    #[test]
    fn test_empty_vector_is_unavailable() {
        let resolver = Resolver::new().unwrap();
        let mut s = scores(D, [0.0; 3], [0.0; 4], [0.0; 3]);
        s.dru = ProbabilityVector::default();
        let err = resolver.resolve(&s).unwrap_err();
        assert!(matches!(err, SignError::ClassifierUnavailable { .. }));
    }

    #[test]
    fn test_rejects_blank_in_group() {
        let err = Resolver::with_groups(vec![LabelGroup {
            name: "BAD",
            labels: &[Blank, D, R],
            specialist: ClassifierRole::Dru,
        }])
        .unwrap_err();
        assert!(err.to_string().contains("contains blank"));
    }

    #[test]
    fn test_rejects_mismatched_specialist() {
        let err = Resolver::with_groups(vec![LabelGroup {
            name: "DRU",
            labels: &[D, R, U],
            specialist: ClassifierRole::Mns,
        }])
        .unwrap_err();
        assert!(matches!(err, SignError::LabelSetConfig { .. }));
    }

    #[test]
    fn test_rejects_shadowed_group() {
        let mut groups = DISAMBIGUATION_GROUPS.to_vec();
        groups.push(DISAMBIGUATION_GROUPS[0]);
        let err = Resolver::with_groups(groups).unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_groups() {
        assert!(
            Resolver::with_groups(vec![LabelGroup {
                name: "EMPTY",
                labels: &[],
                specialist: ClassifierRole::Dru,
            }])
            .is_err()
        );
        assert!(
            Resolver::with_groups(vec![LabelGroup {
                name: "DUP",
                labels: &[M, N, S, S],
                specialist: ClassifierRole::Mns,
            }])
            .is_err()
        );
    }
}
