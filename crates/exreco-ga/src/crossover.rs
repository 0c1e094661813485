//! Uniform crossover with weakness-weighted duplicate repair.

use exreco_catalog::ExerciseId;
use rand::Rng;

use crate::{population::Individual, weighting::SamplingWeights};

/// Uniform crossover operator.
///
/// With probability `rate` an offspring takes each gene position from parent A or B with
/// equal probability. A position whose pick repeats an exercise already in the offspring
/// is left empty and refilled afterwards with an unused exercise drawn through
/// [`SamplingWeights`]. Otherwise (probability `1 - rate`) the offspring is an unmodified
/// copy of one parent, chosen at random.
#[derive(Debug, Clone, Copy)]
pub struct UniformCrossover {
    rate: f32,
}

impl UniformCrossover {
    #[must_use]
    pub fn new(rate: f32) -> Self {
        Self { rate }
    }

    /// Produces one offspring; call twice per pair for two.
    ///
    /// # Panics
    ///
    /// Panics if the parents are longer than the number of active catalog exercises,
    /// which a validated run never allows.
    #[must_use]
    pub fn offspring<R>(
        &self,
        a: &Individual,
        b: &Individual,
        weights: &SamplingWeights<'_>,
        rng: &mut R,
    ) -> Individual
    where
        R: Rng + ?Sized,
    {
        if !rng.random_bool(f64::from(self.rate)) {
            return if rng.random_bool(0.5) {
                a.clone()
            } else {
                b.clone()
            };
        }

        debug_assert_eq!(a.genes().len(), b.genes().len());
        let mut slots = Vec::<Option<ExerciseId>>::with_capacity(a.genes().len());
        for (ga, gb) in a.genes().iter().zip(b.genes()) {
            let pick = if rng.random_bool(0.5) { *ga } else { *gb };
            if slots.contains(&Some(pick)) {
                slots.push(None);
            } else {
                slots.push(Some(pick));
            }
        }

        let mut genes = slots.iter().flatten().copied().collect::<Vec<_>>();
        for slot in &mut slots {
            if slot.is_none() {
                let id = weights
                    .draw_excluding(rng, &genes)
                    .expect("catalog has enough active exercises to repair offspring");
                genes.push(id);
                *slot = Some(id);
            }
        }
        Individual::new(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use exreco_catalog::{Difficulty, Exercise, ExerciseCatalog, WeaknessProfile};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn catalog() -> ExerciseCatalog {
        ExerciseCatalog::new(
            (1..=8)
                .map(|i| {
                    let skill = ["algebra", "geometry", "reading", "writing"][(i as usize) % 4];
                    Exercise::new(i, skill, Difficulty::Medium)
                })
                .collect(),
        )
        .unwrap()
    }

    fn individual(raw: &[u32]) -> Individual {
        Individual::new(raw.iter().copied().map(ExerciseId).collect())
    }

    #[test]
    fn test_offspring_never_has_duplicates() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 1.0)]).unwrap();
        let weights = SamplingWeights::new(&catalog, &profile);
        let crossover = UniformCrossover::new(1.0);
        let mut rng = Pcg32::seed_from_u64(17);
        // shared genes at different positions force repairs
        let a = individual(&[1, 2, 3, 4]);
        let b = individual(&[4, 3, 2, 1]);
        for _ in 0..200 {
            let child = crossover.offspring(&a, &b, &weights, &mut rng);
            assert_eq!(child.genes().len(), 4);
            assert!(!child.has_duplicates());
            assert!(child.genes().iter().all(|id| catalog.is_active(*id)));
        }
    }

    #[test]
    fn test_genes_come_from_parents_when_disjoint() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let weights = SamplingWeights::new(&catalog, &profile);
        let crossover = UniformCrossover::new(1.0);
        let mut rng = Pcg32::seed_from_u64(2);
        let a = individual(&[1, 2, 3]);
        let b = individual(&[4, 5, 6]);
        for _ in 0..50 {
            let child = crossover.offspring(&a, &b, &weights, &mut rng);
            for (i, gene) in child.genes().iter().enumerate() {
                assert!(*gene == a.genes()[i] || *gene == b.genes()[i]);
            }
        }
    }

    #[test]
    fn test_zero_rate_copies_a_parent() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let weights = SamplingWeights::new(&catalog, &profile);
        let crossover = UniformCrossover::new(0.0);
        let mut rng = Pcg32::seed_from_u64(8);
        let a = individual(&[1, 2, 3]);
        let b = individual(&[6, 7, 8]);
        for _ in 0..20 {
            let child = crossover.offspring(&a, &b, &weights, &mut rng);
            assert!(child == a || child == b);
        }
    }
}
