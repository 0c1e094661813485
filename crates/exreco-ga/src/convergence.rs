//! Early-stopping decisions.

use serde::Serialize;

use crate::config::GaConfig;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The generation cap was reached.
    #[display("max_generations")]
    MaxGenerations,
    /// Best fitness improved by no more than epsilon for `patience` generations.
    #[display("plateau")]
    Plateau,
    /// Population fitness variance fell below the threshold.
    #[display("low_variance")]
    LowVariance,
    /// The wall-clock budget ran out.
    #[display("deadline")]
    Deadline,
    /// The caller cancelled the run.
    #[display("cancelled")]
    Cancelled,
}

/// Progress of a run as seen by the operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationState {
    pub generation: usize,
    /// Best fitness seen so far in the run.
    pub best_fitness: f32,
    /// Consecutive generations without an improvement above epsilon.
    pub stagnant_generations: usize,
}

/// Tracks best fitness per generation and decides when to stop.
///
/// The plateau check runs before the variance check. The variance check is skipped for
/// generation 0, which has not been through selection yet.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    epsilon: f32,
    patience: usize,
    variance_threshold: f32,
    best: Option<f32>,
    stagnant: usize,
    last_improvement_generation: usize,
    history: Vec<f32>,
}

impl ConvergenceMonitor {
    #[must_use]
    pub fn new(epsilon: f32, patience: usize, variance_threshold: f32) -> Self {
        Self {
            epsilon,
            patience,
            variance_threshold,
            best: None,
            stagnant: 0,
            last_improvement_generation: 0,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &GaConfig) -> Self {
        Self::new(
            config.convergence_epsilon(),
            config.convergence_patience(),
            config.variance_threshold(),
        )
    }

    /// Records one evaluated generation and returns a reason to stop, if any.
    ///
    /// An improvement counts only when it exceeds epsilon, so with `epsilon = 0` an
    /// unchanged best fitness is a stagnant generation.
    pub fn observe(
        &mut self,
        generation: usize,
        best_fitness: f32,
        variance: f32,
    ) -> Option<TerminationReason> {
        match self.best {
            None => {
                self.best = Some(best_fitness);
                self.last_improvement_generation = generation;
            }
            Some(previous) => {
                if best_fitness - previous > self.epsilon {
                    self.stagnant = 0;
                    self.last_improvement_generation = generation;
                } else {
                    self.stagnant += 1;
                }
                if best_fitness > previous {
                    self.best = Some(best_fitness);
                }
            }
        }
        self.history.push(self.best_fitness());

        if self.stagnant >= self.patience {
            Some(TerminationReason::Plateau)
        } else if generation > 0 && variance < self.variance_threshold {
            Some(TerminationReason::LowVariance)
        } else {
            None
        }
    }

    #[must_use]
    pub fn state(&self, generation: usize) -> GenerationState {
        GenerationState {
            generation,
            best_fitness: self.best_fitness(),
            stagnant_generations: self.stagnant,
        }
    }

    /// Best fitness seen so far, or 0 before the first observation.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best.unwrap_or(0.0)
    }

    #[must_use]
    pub fn stagnant_generations(&self) -> usize {
        self.stagnant
    }

    #[must_use]
    pub fn last_improvement_generation(&self) -> usize {
        self.last_improvement_generation
    }

    /// Best-known fitness after each observed generation.
    #[must_use]
    pub fn history(&self) -> &[f32] {
        &self.history
    }
}
