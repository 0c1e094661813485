//! Weakness-biased, fitness-proportional parent selection.
//!
//! A candidate's selection weight is its combined fitness times a coverage bias:
//!
//! ```text
//! bias(i) = 1 + COVERAGE_BIAS · Σ_{s ∈ weak skills covered by i} weakness(s) / (1 + picks(s))
//!                               ─────────────────────────────────────────────────────────
//!                                        Σ_{s ∈ skills of active exercises} weakness(s)
//! ```
//!
//! `weakness(s)` is the share of the shared sampling weight above the baseline
//! ([`SamplingWeights::weakness_weight`]), so selection and sampling bias toward the same
//! skills by the same amounts. `picks(s)` counts how many parents chosen earlier in the same generation already
//! cover skill `s`. Skills that chosen parents rarely cover therefore pull harder, which
//! keeps the mating pool from collapsing onto a single weakness.

use std::collections::{BTreeMap, BTreeSet};

use exreco_catalog::SkillTag;
use rand::Rng;

use crate::{
    population::Individual,
    weighting::{SamplingWeights, weighted_index},
};

/// Strength of the anti-redundancy bias. At 1.0 an individual that covers every weakness
/// nobody has picked yet is up to twice as likely to be chosen.
pub const COVERAGE_BIAS: f32 = 1.0;

/// Parent selection driven by the same severity policy as [`SamplingWeights`].
#[derive(Debug, Clone, Copy)]
pub struct WeaknessBiasedSelection<'a> {
    weights: SamplingWeights<'a>,
    reachable_weakness: f32,
}

impl<'a> WeaknessBiasedSelection<'a> {
    #[must_use]
    pub fn new(weights: &SamplingWeights<'a>) -> Self {
        Self {
            weights: *weights,
            reachable_weakness: weights.reachable_weakness(),
        }
    }

    /// Draws `pair_count` parent pairs as indices into `individuals`.
    ///
    /// Pairs are drawn with replacement across pairs; the two parents of a pair are
    /// always distinct when `individuals.len() >= 2`. If every fitness is zero the draw
    /// is uniform.
    pub fn select_pairs<R>(
        &self,
        individuals: &[Individual],
        pair_count: usize,
        rng: &mut R,
    ) -> Vec<(usize, usize)>
    where
        R: Rng + ?Sized,
    {
        if individuals.is_empty() {
            return Vec::new();
        }
        let fitness = individuals.iter().map(Individual::score).collect::<Vec<_>>();
        let uniform = fitness.iter().all(|f| *f <= 0.0);
        let coverage = individuals
            .iter()
            .map(|ind| self.weak_skills_covered(ind))
            .collect::<Vec<_>>();
        let total_weakness = self.reachable_weakness;

        let mut picks = BTreeMap::<&SkillTag, u32>::new();
        let mut pairs = Vec::with_capacity(pair_count);
        for _ in 0..pair_count {
            let mut pick_one = |exclude: Option<usize>, picks: &mut BTreeMap<&'a SkillTag, u32>| {
                let mut weights = (0..individuals.len())
                    .map(|i| {
                        if Some(i) == exclude {
                            0.0
                        } else if uniform {
                            1.0
                        } else {
                            fitness[i] * coverage_bias(&coverage[i], picks, total_weakness)
                        }
                    })
                    .collect::<Vec<_>>();
                if weights.iter().all(|w| *w <= 0.0) {
                    for (i, w) in weights.iter_mut().enumerate() {
                        *w = if Some(i) == exclude { 0.0 } else { 1.0 };
                    }
                }
                let chosen = weighted_index(rng, &weights).unwrap_or(0);
                for (skill, _) in &coverage[chosen] {
                    *picks.entry(*skill).or_default() += 1;
                }
                chosen
            };
            let first = pick_one(None, &mut picks);
            let second = if individuals.len() >= 2 {
                pick_one(Some(first), &mut picks)
            } else {
                first
            };
            pairs.push((first, second));
        }
        pairs
    }

    /// Weak skills touched by at least one gene, with their weakness weight.
    fn weak_skills_covered(&self, individual: &Individual) -> BTreeSet<(&'a SkillTag, OrdWeight)> {
        let catalog = self.weights.catalog();
        individual
            .genes()
            .iter()
            .filter_map(|id| catalog.get(*id))
            .filter_map(|e| {
                let weight = self.weights.weakness_weight(&e.skill);
                (weight > 0.0).then_some((&e.skill, OrdWeight(weight)))
            })
            .collect()
    }
}

/// Weight wrapper so covered skills can live in an ordered set.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrdWeight(f32);

impl Eq for OrdWeight {}

impl PartialOrd for OrdWeight {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdWeight {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn coverage_bias(
    covered: &BTreeSet<(&SkillTag, OrdWeight)>,
    picks: &BTreeMap<&SkillTag, u32>,
    total_weakness: f32,
) -> f32 {
    if total_weakness <= 0.0 {
        return 1.0;
    }
    #[expect(clippy::cast_precision_loss)]
    let novelty = covered
        .iter()
        .map(|(skill, weight)| {
            let seen = picks.get(skill).copied().unwrap_or(0);
            weight.0 / (1.0 + seen as f32)
        })
        .sum::<f32>();
    1.0 + COVERAGE_BIAS * novelty / total_weakness
}
