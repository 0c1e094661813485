//! Individuals, populations and the parallel fitness evaluation barrier.

use std::{cmp::Ordering, num::NonZeroUsize, thread};

use exreco_catalog::ExerciseId;
use exreco_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{
    config::ConfigurationError,
    fitness::{FitnessComponents, FitnessEvaluator},
    weighting::SamplingWeights,
};

/// A candidate recommendation: a fixed-length, duplicate-free exercise sequence.
///
/// Fitness is cached after evaluation and cleared whenever a gene changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genes: Vec<ExerciseId>,
    fitness: Option<FitnessComponents>,
}

impl Individual {
    /// Creates an unevaluated individual.
    ///
    /// # Panics
    ///
    /// Panics if `genes` contains the same exercise twice.
    #[must_use]
    pub fn new(genes: Vec<ExerciseId>) -> Self {
        let this = Self {
            genes,
            fitness: None,
        };
        assert!(!this.has_duplicates(), "individual contains duplicate exercises");
        this
    }

    /// Exercise ids in slot order.
    #[must_use]
    pub fn genes(&self) -> &[ExerciseId] {
        &self.genes
    }

    /// Cached fitness breakdown, `None` until evaluated.
    #[must_use]
    pub fn fitness(&self) -> Option<&FitnessComponents> {
        self.fitness.as_ref()
    }

    /// Combined fitness, or 0 for an unevaluated individual.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.fitness.map_or(0.0, |f| f.combined)
    }

    /// Whether `id` already occupies one of the slots.
    #[must_use]
    pub fn contains(&self, id: ExerciseId) -> bool {
        self.genes.contains(&id)
    }

    /// Whether any exercise appears more than once.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        let mut sorted = self.genes.clone();
        sorted.sort_unstable();
        sorted.windows(2).any(|w| w[0] == w[1])
    }

    /// Gene set in ascending id order; two individuals with equal keys score the same.
    #[must_use]
    pub fn gene_set(&self) -> Vec<ExerciseId> {
        let mut sorted = self.genes.clone();
        sorted.sort_unstable();
        sorted
    }

    pub(crate) fn set_gene(&mut self, index: usize, id: ExerciseId) {
        debug_assert!(!self.genes.contains(&id) || self.genes[index] == id);
        self.genes[index] = id;
        self.fitness = None;
    }

    pub(crate) fn evaluate(&mut self, evaluator: &FitnessEvaluator<'_>) {
        if self.fitness.is_none() {
            self.fitness = Some(evaluator.evaluate(&self.genes));
        }
    }
}

/// Ranking order: higher fitness first, ties broken by the lowest exercise id sequence.
#[must_use]
pub fn compare_rank(a: &Individual, b: &Individual) -> Ordering {
    b.score()
        .total_cmp(&a.score())
        .then_with(|| a.genes.cmp(&b.genes))
}

/// A population owned by exactly one GA run.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Builds generation 0 by weakness-weighted sampling without replacement.
    pub fn initialize<R>(
        weights: &SamplingWeights<'_>,
        size: usize,
        num_exercises: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let available = weights.catalog().active_count();
        if num_exercises > available {
            return Err(ConfigurationError::NotEnoughExercises {
                requested: num_exercises,
                available,
            });
        }
        let individuals = (0..size)
            .map(|_| Individual::new(weights.draw_distinct(rng, num_exercises)))
            .collect();
        Ok(Self { individuals })
    }

    /// Wraps already-built individuals; they are not evaluated or ranked.
    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Individuals in their current order (best first once ranked).
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Evaluates every unevaluated individual in parallel, then ranks the population.
    ///
    /// All worker threads are joined before this returns, so callers always observe a
    /// fully evaluated generation.
    pub fn evaluate_fitness(&mut self, evaluator: &FitnessEvaluator<'_>) {
        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let chunk_size = self.individuals.len().div_ceil(workers).max(1);
        thread::scope(|s| {
            for chunk in self.individuals.chunks_mut(chunk_size) {
                s.spawn(move || {
                    for ind in chunk {
                        ind.evaluate(evaluator);
                    }
                });
            }
        });
        self.rank();
    }

    pub(crate) fn rank(&mut self) {
        self.individuals.sort_by(compare_rank);
    }

    /// Whether the population is sorted by [`compare_rank`].
    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.individuals
            .is_sorted_by(|a, b| compare_rank(a, b) != Ordering::Greater)
    }

    /// Returns the best individual of a ranked population.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Returns up to `count` individuals with pairwise distinct gene sets, best first.
    #[must_use]
    pub fn top_distinct(&self, count: usize) -> Vec<&Individual> {
        let mut seen = Vec::<Vec<ExerciseId>>::new();
        let mut top = Vec::with_capacity(count);
        for ind in &self.individuals {
            if top.len() == count {
                break;
            }
            let key = ind.gene_set();
            if !seen.contains(&key) {
                seen.push(key);
                top.push(ind);
            }
        }
        top
    }

    /// Summary of combined fitness over evaluated individuals.
    ///
    /// Returns `None` when nothing has been evaluated yet.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(Individual::score))
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.individuals.truncate(len);
    }

    pub(crate) fn extend<I>(&mut self, individuals: I)
    where
        I: IntoIterator<Item = Individual>,
    {
        self.individuals.extend(individuals);
    }
}
