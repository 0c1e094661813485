//! Adaptive per-gene mutation.
//!
//! Each gene is replaced with probability
//!
//! ```text
//! rate = base_rate × (1 + stagnation_factor) × (1 + low_utility_bonus)      (capped at 1)
//! stagnation_factor = min(stagnant_generations / patience, 1)
//! low_utility_bonus = LOW_UTILITY_WEIGHT × (max_utility − utility) / (max_utility − min_utility)
//! ```
//!
//! Stagnation doubles the rate at most, reached when the plateau counter hits the
//! convergence patience. The utility bonus is relative to the active catalog's utility
//! range; a catalog with a single utility value gets no bonus. Replacements are drawn
//! through [`SamplingWeights`] from exercises not already in the individual.

use exreco_catalog::{Exercise, ExerciseCatalog};
use rand::Rng;

use crate::{convergence::GenerationState, population::Individual, weighting::SamplingWeights};

/// Scale of the bonus applied to the least useful exercise in the catalog.
pub const LOW_UTILITY_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveMutation {
    base_rate: f32,
    patience: usize,
    utility_range: Option<(f32, f32)>,
}

impl AdaptiveMutation {
    #[must_use]
    pub fn new(base_rate: f32, patience: usize, catalog: &ExerciseCatalog) -> Self {
        Self {
            base_rate,
            patience: patience.max(1),
            utility_range: catalog.utility_range(),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn stagnation_factor(&self, state: &GenerationState) -> f32 {
        (state.stagnant_generations as f32 / self.patience as f32).min(1.0)
    }

    #[must_use]
    pub fn low_utility_bonus(&self, exercise: &Exercise) -> f32 {
        match self.utility_range {
            Some((lo, hi)) if hi - lo > f32::EPSILON => {
                LOW_UTILITY_WEIGHT * ((hi - exercise.utility) / (hi - lo)).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Mutation probability for one gene.
    #[must_use]
    pub fn gene_rate(&self, exercise: &Exercise, state: &GenerationState) -> f32 {
        (self.base_rate
            * (1.0 + self.stagnation_factor(state))
            * (1.0 + self.low_utility_bonus(exercise)))
        .clamp(0.0, 1.0)
    }

    /// Mutates `individual` in place and returns how many genes were replaced.
    ///
    /// Genes that no longer reference an active exercise are always replaced.
    pub fn mutate<R>(
        &self,
        individual: &mut Individual,
        weights: &SamplingWeights<'_>,
        state: &GenerationState,
        rng: &mut R,
    ) -> usize
    where
        R: Rng + ?Sized,
    {
        let catalog = weights.catalog();
        let mut mutated = 0;
        for index in 0..individual.genes().len() {
            let gene = individual.genes()[index];
            let rate = catalog
                .get(gene)
                .filter(|e| e.active)
                .map_or(1.0, |e| self.gene_rate(e, state));
            if !rng.random_bool(f64::from(rate)) {
                continue;
            }
            if let Some(replacement) = weights.draw_excluding(rng, individual.genes()) {
                individual.set_gene(index, replacement);
                mutated += 1;
            }
        }
        mutated
    }
}
