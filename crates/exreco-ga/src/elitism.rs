//! Elite preservation between generations.

use crate::population::Population;

/// Carries the best individuals of a generation into the next one unchanged.
///
/// The top `elite_count` parents (by [`compare_rank`](crate::population::compare_rank))
/// overwrite the `elite_count` lowest-ranked offspring. Because the best parent always
/// survives when `elite_count >= 1`, the best-known fitness never decreases.
#[derive(Debug, Clone, Copy)]
pub struct Elitism {
    elite_count: usize,
}

impl Elitism {
    /// Creates an operator that keeps `elite_count` parents per generation.
    #[must_use]
    pub fn new(elite_count: usize) -> Self {
        Self { elite_count }
    }

    /// Number of parents carried over unchanged.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.elite_count
    }

    /// Merges elites from `parents` into `offspring`.
    ///
    /// Both populations must be evaluated and ranked. The result keeps the offspring's
    /// size and is ranked again.
    #[must_use]
    pub fn apply(&self, parents: &Population, mut offspring: Population) -> Population {
        assert!(parents.is_ranked(), "parents must be ranked before elitism");
        assert!(offspring.is_ranked(), "offspring must be ranked before elitism");

        let size = offspring.len();
        let elites = self.elite_count.min(parents.len()).min(size);
        offspring.truncate(size - elites);
        offspring.extend(parents.individuals()[..elites].iter().cloned());
        offspring.rank();
        offspring
    }
}

#[cfg(test)]
mod tests {
    use exreco_catalog::{Difficulty, Exercise, ExerciseCatalog, ExerciseId, WeaknessProfile};

    use super::*;
    use crate::{fitness::FitnessEvaluator, population::Individual};

    fn catalog() -> ExerciseCatalog {
        ExerciseCatalog::new(vec![
            Exercise::new(1, "algebra", Difficulty::Easy),
            Exercise::new(2, "algebra", Difficulty::Medium),
            Exercise::new(3, "geometry", Difficulty::Easy),
            Exercise::new(4, "geometry", Difficulty::Hard),
            Exercise::new(5, "reading", Difficulty::Medium),
        ])
        .unwrap()
    }

    fn population(evaluator: &FitnessEvaluator<'_>, raw: &[[u32; 2]]) -> Population {
        let mut population = Population::from_individuals(
            raw.iter()
                .map(|g| Individual::new(g.iter().copied().map(ExerciseId).collect()))
                .collect(),
        );
        population.evaluate_fitness(evaluator);
        population
    }

    #[test]
    fn test_elites_replace_worst_offspring() {
        let catalog = catalog();
        let profile = WeaknessProfile::new([("algebra", 1.0)]).unwrap();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 2);
        let parents = population(&evaluator, &[[1, 2], [1, 3], [3, 4]]);
        let offspring = population(&evaluator, &[[3, 5], [4, 5], [2, 5]]);
        let worst_offspring = offspring.individuals().last().unwrap().clone();

        let next = Elitism::new(1).apply(&parents, offspring);
        assert_eq!(next.len(), 3);
        assert!(next.is_ranked());
        assert_eq!(next.best(), parents.best());
        assert!(!next.individuals().contains(&worst_offspring));
    }

    #[test]
    fn test_full_elitism_freezes_population() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 2);
        let parents = population(&evaluator, &[[1, 3], [2, 4]]);
        let offspring = population(&evaluator, &[[4, 5], [1, 2]]);
        let next = Elitism::new(2).apply(&parents, offspring);
        assert_eq!(next, parents);
    }

    #[test]
    fn test_zero_elites_keeps_offspring() {
        let catalog = catalog();
        let profile = WeaknessProfile::default();
        let evaluator = FitnessEvaluator::new(&catalog, &profile, 2);
        let parents = population(&evaluator, &[[1, 3], [2, 4]]);
        let offspring = population(&evaluator, &[[4, 5], [1, 2]]);
        let next = Elitism::new(0).apply(&parents, offspring.clone());
        assert_eq!(next, offspring);
    }
}
