//! Weakness-biased sampling shared by initialization, crossover repair and mutation.
//!
//! Every operator that draws a fresh exercise goes through [`SamplingWeights`], so the
//! bias policy (skill severity to sampling weight) lives in one place:
//!
//! ```text
//! weight(exercise) = BASELINE_WEIGHT + severity(exercise.skill)
//! ```
//!
//! The baseline keeps exercises for skills absent from the profile reachable. With an
//! empty profile every active exercise has the same weight and sampling is uniform.
//!
//! Parent selection reads the same policy through [`SamplingWeights::weakness_weight`]
//! (the part of the weight above the baseline) and
//! [`SamplingWeights::reachable_weakness`], which only counts skills some active exercise
//! can cover.

use std::collections::BTreeSet;

use exreco_catalog::{Exercise, ExerciseCatalog, ExerciseId, SkillTag, WeaknessProfile};
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};

/// Sampling weight of an exercise whose skill has zero severity.
pub const BASELINE_WEIGHT: f32 = 0.1;

/// Maps skill severity to a sampling weight and draws exercises accordingly.
#[derive(Debug, Clone, Copy)]
pub struct SamplingWeights<'a> {
    catalog: &'a ExerciseCatalog,
    profile: &'a WeaknessProfile,
}

impl<'a> SamplingWeights<'a> {
    #[must_use]
    pub fn new(catalog: &'a ExerciseCatalog, profile: &'a WeaknessProfile) -> Self {
        Self { catalog, profile }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a ExerciseCatalog {
        self.catalog
    }

    /// Bias a skill adds on top of [`BASELINE_WEIGHT`]; zero for skills not in the profile.
    #[must_use]
    pub fn weakness_weight(&self, skill: &SkillTag) -> f32 {
        self.profile.severity(skill)
    }

    #[must_use]
    pub fn skill_weight(&self, skill: &SkillTag) -> f32 {
        BASELINE_WEIGHT + self.weakness_weight(skill)
    }

    /// Sum of [`weakness_weight`](Self::weakness_weight) over the distinct skills of
    /// active exercises.
    ///
    /// Weak skills that no active exercise targets are left out, since no individual can
    /// ever cover them.
    #[must_use]
    pub fn reachable_weakness(&self) -> f32 {
        self.catalog
            .active()
            .map(|e| &e.skill)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|skill| self.weakness_weight(skill))
            .sum()
    }

    #[must_use]
    pub fn exercise_weight(&self, exercise: &Exercise) -> f32 {
        self.skill_weight(&exercise.skill)
    }

    /// Draws one active exercise that is not in `exclude`.
    ///
    /// Returns `None` only when every active exercise is excluded.
    pub fn draw_excluding<R>(&self, rng: &mut R, exclude: &[ExerciseId]) -> Option<ExerciseId>
    where
        R: Rng + ?Sized,
    {
        let candidates = self
            .catalog
            .active()
            .filter(|e| !exclude.contains(&e.id))
            .collect::<Vec<_>>();
        let weights = candidates
            .iter()
            .map(|e| self.exercise_weight(e))
            .collect::<Vec<_>>();
        weighted_index(rng, &weights).map(|i| candidates[i].id)
    }

    /// Draws up to `count` distinct active exercises without replacement.
    pub fn draw_distinct<R>(&self, rng: &mut R, count: usize) -> Vec<ExerciseId>
    where
        R: Rng + ?Sized,
    {
        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count {
            let Some(id) = self.draw_excluding(rng, &chosen) else {
                break;
            };
            chosen.push(id);
        }
        chosen
    }
}

/// Picks an index with probability proportional to `weights`.
///
/// Falls back to a uniform pick when no weight is positive, and returns `None` for an
/// empty slice.
pub fn weighted_index<R>(rng: &mut R, weights: &[f32]) -> Option<usize>
where
    R: Rng + ?Sized,
{
    if weights.is_empty() {
        return None;
    }
    match WeightedIndex::new(weights) {
        Ok(dist) => Some(dist.sample(rng)),
        Err(_) => Some(rng.random_range(0..weights.len())),
    }
}

#[cfg(test)]
mod tests {
    use exreco_catalog::Difficulty;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn catalog() -> ExerciseCatalog {
        ExerciseCatalog::new(vec![
            Exercise::new(1, "algebra", Difficulty::Easy),
            Exercise::new(2, "algebra", Difficulty::Medium),
            Exercise::new(3, "geometry", Difficulty::Easy),
            Exercise::new(4, "geometry", Difficulty::Hard),
            Exercise::new(5, "reading", Difficulty::Medium).inactive(),
        ])
        .unwrap()
    }

    #[test]
    fn test_weight_grows_with_severity() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 1.0), ("geometry", 0.2)]).unwrap();
        let weights = SamplingWeights::new(&catalog, &profile);
        let algebra = weights.skill_weight(&"algebra".into());
        let geometry = weights.skill_weight(&"geometry".into());
        let unknown = weights.skill_weight(&"history".into());
        assert!(algebra > geometry);
        assert!(geometry > unknown);
        assert_eq!(unknown, BASELINE_WEIGHT);
    }

    #[test]
    fn test_reachable_weakness_skips_uncoverable_skills() {
        let catalog = catalog();
        let profile =
            WeaknessProfile::new([("algebra", 0.3), ("reading", 0.5), ("history", 1.0)]).unwrap();
        let weights = SamplingWeights::new(&catalog, &profile);
        // reading is only on an inactive exercise, history on none
        assert!((weights.reachable_weakness() - 0.3).abs() < 1e-6);
        assert_eq!(weights.weakness_weight(&"geometry".into()), 0.0);
        assert_eq!(
            weights.skill_weight(&"algebra".into()),
            BASELINE_WEIGHT + weights.weakness_weight(&"algebra".into())
        );
    }

    #[test]
    fn test_draw_distinct_never_repeats_or_picks_inactive() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let weights = SamplingWeights::new(&catalog, &profile);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let mut ids = weights.draw_distinct(&mut rng, 4);
            assert_eq!(ids.len(), 4);
            assert!(ids.iter().all(|id| catalog.is_active(*id)));
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 4);
        }
        assert_eq!(weights.draw_distinct(&mut rng, 10).len(), 4);
    }

    #[test]
    fn test_draw_excluding_exhausted() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let weights = SamplingWeights::new(&catalog, &profile);
        let mut rng = Pcg32::seed_from_u64(1);
        let all = [ExerciseId(1), ExerciseId(2), ExerciseId(3), ExerciseId(4)];
        assert_eq!(weights.draw_excluding(&mut rng, &all), None);
        assert_eq!(
            weights.draw_excluding(&mut rng, &all[..3]),
            Some(ExerciseId(4))
        );
    }

    #[test]
    fn test_severe_skill_is_oversampled() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 1.0)]).unwrap();
        let weights = SamplingWeights::new(&catalog, &profile);
        let mut rng = Pcg32::seed_from_u64(42);
        let algebra = (0..2000)
            .filter_map(|_| weights.draw_excluding(&mut rng, &[]))
            .filter(|id| id.0 <= 2)
            .count();
        // expected share is 2.2 / 2.4
        assert!(algebra > 1600, "algebra drawn {algebra} times");
    }

    #[test]
    fn test_weighted_index_fallbacks() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(weighted_index(&mut rng, &[]), None);
        for _ in 0..20 {
            let i = weighted_index(&mut rng, &[0.0, 0.0, 0.0]).unwrap();
            assert!(i < 3);
        }
        assert_eq!(weighted_index(&mut rng, &[0.0, 2.0, 0.0]), Some(1));
    }
}
