//! Multi-criteria fitness of a candidate exercise bundle.
//!
//! Each individual is scored on three criteria, each in `[0, 1]`:
//!
//! - **Weakness**: total profile severity of the individual's exercises, divided by the
//!   largest total any `num_exercises` distinct active exercises could reach. When that
//!   maximum is zero (empty profile, or no catalog skill overlaps the profile) the score is
//!   the neutral constant [`NEUTRAL_WEAKNESS_SCORE`], so selection pressure comes from the
//!   other two criteria only.
//! - **Diversity**: distinct skill tags divided by `num_exercises`.
//! - **Difficulty**: mean per-exercise affinity between the exercise's difficulty and the
//!   [`SeverityBand`] of its skill.
//!
//! The combined fitness is `0.7·weakness + 0.2·diversity + 0.1·difficulty`, clamped to
//! `[0, 1]`. Evaluation is a pure function of the genes, catalog and profile.

use std::collections::BTreeSet;

use exreco_catalog::{Difficulty, ExerciseCatalog, ExerciseId, WeaknessProfile};
use serde::Serialize;

pub const WEAKNESS_WEIGHT: f32 = 0.7;
pub const DIVERSITY_WEIGHT: f32 = 0.2;
pub const DIFFICULTY_WEIGHT: f32 = 0.1;

/// Weakness score used when the profile carries no usable severity.
pub const NEUTRAL_WEAKNESS_SCORE: f32 = 0.5;

/// Per-criterion fitness breakdown of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitnessComponents {
    pub weakness: f32,
    pub diversity: f32,
    pub difficulty: f32,
    pub combined: f32,
}

impl FitnessComponents {
    #[must_use]
    pub fn new(weakness: f32, diversity: f32, difficulty: f32) -> Self {
        let combined = (WEAKNESS_WEIGHT * weakness
            + DIVERSITY_WEIGHT * diversity
            + DIFFICULTY_WEIGHT * difficulty)
            .clamp(0.0, 1.0);
        Self {
            weakness,
            diversity,
            difficulty,
            combined,
        }
    }
}

/// How weak the learner is in a skill, bucketed for difficulty matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBand {
    /// Severity below 1/3: the learner copes, harder work pays off.
    Low,
    Moderate,
    /// Severity of 2/3 or more: start from easier material.
    High,
}

impl SeverityBand {
    #[must_use]
    pub fn from_severity(severity: f32) -> Self {
        if severity >= 2.0 / 3.0 {
            Self::High
        } else if severity >= 1.0 / 3.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Returns how well `difficulty` suits this band, in `[0, 1]`.
    #[must_use]
    pub const fn affinity(self, difficulty: Difficulty) -> f32 {
        match (self, difficulty) {
            (Self::High, Difficulty::Easy)
            | (Self::Moderate, Difficulty::Medium)
            | (Self::Low, Difficulty::Hard) => 1.0,
            (Self::High | Self::Low, Difficulty::Medium) => 0.9,
            (Self::Moderate, Difficulty::Hard) => 0.7,
            (Self::Moderate, Difficulty::Easy) => 0.6,
            (Self::High, Difficulty::Hard) | (Self::Low, Difficulty::Easy) => 0.3,
        }
    }
}

/// Scores individuals against one catalog and profile.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    catalog: &'a ExerciseCatalog,
    profile: &'a WeaknessProfile,
    num_exercises: usize,
    max_weakness_sum: f32,
}

impl<'a> FitnessEvaluator<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a ExerciseCatalog,
        profile: &'a WeaknessProfile,
        num_exercises: usize,
    ) -> Self {
        let mut severities = catalog
            .active()
            .map(|e| profile.severity(&e.skill))
            .collect::<Vec<_>>();
        severities.sort_by(|a, b| b.total_cmp(a));
        let max_weakness_sum = severities.iter().take(num_exercises).sum();
        Self {
            catalog,
            profile,
            num_exercises,
            max_weakness_sum,
        }
    }

    /// Returns `true` when weakness scoring falls back to the neutral constant.
    #[must_use]
    pub fn is_weakness_neutral(&self) -> bool {
        self.max_weakness_sum <= 0.0
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn evaluate(&self, genes: &[ExerciseId]) -> FitnessComponents {
        // Sum in id order so that permutations of a gene set score bit-identically.
        let mut exercises = genes
            .iter()
            .filter_map(|id| self.catalog.get(*id))
            .collect::<Vec<_>>();
        exercises.sort_by_key(|e| e.id);
        if exercises.is_empty() || self.num_exercises == 0 {
            return FitnessComponents::new(0.0, 0.0, 0.0);
        }

        let weakness = if self.is_weakness_neutral() {
            NEUTRAL_WEAKNESS_SCORE
        } else {
            let sum = exercises
                .iter()
                .map(|e| self.profile.severity(&e.skill))
                .sum::<f32>();
            (sum / self.max_weakness_sum).clamp(0.0, 1.0)
        };

        let skills = exercises.iter().map(|e| &e.skill).collect::<BTreeSet<_>>();
        let diversity = (skills.len() as f32 / self.num_exercises as f32).clamp(0.0, 1.0);

        let difficulty = exercises
            .iter()
            .map(|e| {
                SeverityBand::from_severity(self.profile.severity(&e.skill)).affinity(e.difficulty)
            })
            .sum::<f32>()
            / exercises.len() as f32;

        FitnessComponents::new(weakness, diversity, difficulty)
    }
}

#[cfg(test)]
mod tests {
    use exreco_catalog::Exercise;

    use super::*;

    fn catalog() -> ExerciseCatalog {
        ExerciseCatalog::new(vec![
            Exercise::new(1, "algebra", Difficulty::Easy),
            Exercise::new(2, "algebra", Difficulty::Medium),
            Exercise::new(3, "algebra", Difficulty::Hard),
            Exercise::new(4, "geometry", Difficulty::Easy),
            Exercise::new(5, "geometry", Difficulty::Medium),
            Exercise::new(6, "reading", Difficulty::Hard),
        ])
        .unwrap()
    }

    fn ids(raw: &[u32]) -> Vec<ExerciseId> {
        raw.iter().copied().map(ExerciseId).collect()
    }

    #[test]
    fn test_weakness_prefers_weak_skill() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 1.0), ("geometry", 0.0)]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 3);

        let all_algebra = evaluator.evaluate(&ids(&[1, 2, 3]));
        let no_algebra = evaluator.evaluate(&ids(&[4, 5, 6]));
        assert!(all_algebra.weakness > no_algebra.weakness);
        assert_eq!(all_algebra.weakness, 1.0);
        assert_eq!(no_algebra.weakness, 0.0);
    }

    #[test]
    fn test_diversity_counts_distinct_skills() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 3);
        let mixed = evaluator.evaluate(&ids(&[1, 4, 6]));
        let uniform = evaluator.evaluate(&ids(&[1, 2, 3]));
        assert_eq!(mixed.diversity, 1.0);
        assert!((uniform.diversity - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_profile_uses_neutral_weakness() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 2);
        assert!(evaluator.is_weakness_neutral());
        let fitness = evaluator.evaluate(&ids(&[1, 4]));
        assert_eq!(fitness.weakness, NEUTRAL_WEAKNESS_SCORE);
    }

    #[test]
    fn test_difficulty_follows_severity_band() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 0.9)]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 1);
        let easy = evaluator.evaluate(&ids(&[1]));
        let hard = evaluator.evaluate(&ids(&[3]));
        assert!(easy.difficulty > hard.difficulty);

        // reading is absent from the profile, so hard work suits it best
        let reading_hard = evaluator.evaluate(&ids(&[6]));
        assert_eq!(reading_hard.difficulty, 1.0);
    }

    #[test]
    fn test_band_table() {
        assert_eq!(SeverityBand::from_severity(1.0), SeverityBand::High);
        assert_eq!(SeverityBand::from_severity(0.5), SeverityBand::Moderate);
        assert_eq!(SeverityBand::from_severity(0.0), SeverityBand::Low);
        for band in [SeverityBand::Low, SeverityBand::Moderate, SeverityBand::High] {
            let best = Difficulty::ALL
                .iter()
                .map(|d| band.affinity(*d))
                .fold(0.0, f32::max);
            assert_eq!(best, 1.0);
            for d in Difficulty::ALL {
                assert!((0.0..=1.0).contains(&band.affinity(d)));
            }
        }
        let high = SeverityBand::High;
        let low = SeverityBand::Low;
        assert!(high.affinity(Difficulty::Easy) > high.affinity(Difficulty::Hard));
        assert!(low.affinity(Difficulty::Hard) > low.affinity(Difficulty::Easy));
    }

    #[test]
    fn test_combined_is_weighted_and_deterministic() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 0.7), ("reading", 0.2)]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 3);
        let genes = ids(&[2, 5, 6]);
        let a = evaluator.evaluate(&genes);
        let b = evaluator.evaluate(&genes);
        assert_eq!(a, b);
        let expected = 0.7 * a.weakness + 0.2 * a.diversity + 0.1 * a.difficulty;
        assert!((a.combined - expected).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&a.combined));
    }
}
