//! The generation loop that turns a catalog and a weakness profile into a recommendation.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use exreco_catalog::{ExerciseCatalog, ExerciseId, WeaknessProfile};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::{
    RecommendError,
    config::{GaConfig, RunSeed},
    convergence::{ConvergenceMonitor, GenerationState, TerminationReason},
    crossover::UniformCrossover,
    elitism::Elitism,
    fitness::{FitnessComponents, FitnessEvaluator},
    mutation::AdaptiveMutation,
    population::{Individual, Population},
    selection::WeaknessBiasedSelection,
    weighting::SamplingWeights,
};

/// Caller-held flag that stops a run at the next checkpoint between generations.
///
/// Clones share the same flag, so one clone can be handed to another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Phases of a run.
///
/// `Converged` carries whichever stop condition fired first, including the deadline and
/// cancellation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initialized,
    Evaluating,
    Evolving,
    Converged(TerminationReason),
    Terminated(TerminationReason),
}

/// One recommended exercise set with its fitness breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub exercises: Vec<ExerciseId>,
    pub fitness: FitnessComponents,
}

impl Recommendation {
    fn from_individual(individual: &Individual) -> Self {
        Self {
            exercises: individual.genes().to_vec(),
            fitness: individual
                .fitness()
                .copied()
                .unwrap_or_else(|| FitnessComponents::new(0.0, 0.0, 0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    pub elapsed_ms: u64,
    pub initial_best_fitness: f32,
    pub final_best_fitness: f32,
    /// `(final - initial) / max(initial, 0.001) * 100`
    pub improvement_percent: f32,
    pub last_improvement_generation: usize,
    /// Best-known fitness after each evaluated generation, generation 0 first.
    pub best_fitness_history: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDiagnostics {
    /// Number of evolution steps executed.
    pub generations: usize,
    pub termination_reason: TerminationReason,
    /// Seed that reproduces this run, when it was driven by a [`RunSeed`].
    pub seed: Option<RunSeed>,
    pub statistics: RunStatistics,
}

/// Outcome of a run: the best exercise set, runners-up and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub exercises: Vec<ExerciseId>,
    pub fitness: FitnessComponents,
    /// Next-best distinct exercise sets, best first. Holds at most `num_results - 1`
    /// entries.
    pub alternatives: Vec<Recommendation>,
    pub diagnostics: RunDiagnostics,
}

/// What an observer sees after each Evaluating phase.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSnapshot<'p> {
    pub generation: usize,
    /// Best fitness seen so far in the run.
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub variance: f32,
    pub stagnant_generations: usize,
    /// The evaluated, ranked population.
    pub population: &'p Population,
}

/// Runs the genetic algorithm over one catalog snapshot and one learner profile.
///
/// The catalog and profile are borrowed immutably for the whole run. Each run owns its
/// population, so independent recommenders may run concurrently over the same catalog.
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    catalog: &'a ExerciseCatalog,
    profile: &'a WeaknessProfile,
    config: &'a GaConfig,
}

impl<'a> Recommender<'a> {
    pub fn new(
        catalog: &'a ExerciseCatalog,
        profile: &'a WeaknessProfile,
        config: &'a GaConfig,
    ) -> Result<Self, RecommendError> {
        let active = catalog.active_count();
        if active == 0 {
            return Err(RecommendError::EmptyCatalog);
        }
        config.check_catalog(active)?;
        Ok(Self {
            catalog,
            profile,
            config,
        })
    }

    /// Runs to completion with the configured seed, or a fresh one when none is set.
    pub fn recommend(&self) -> Result<RecommendationResult, RecommendError> {
        self.recommend_with_cancel(&CancellationToken::new())
    }

    pub fn recommend_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RecommendationResult, RecommendError> {
        let seed = self
            .config
            .random_seed()
            .unwrap_or_else(|| rand::rng().random());
        self.run_seeded(seed, cancel, |_| {})
    }

    /// Runs with a [`Pcg32`] seeded from `seed`. Identical inputs and seed give an
    /// identical result, elapsed time aside.
    pub fn run_seeded<F>(
        &self,
        seed: RunSeed,
        cancel: &CancellationToken,
        observer: F,
    ) -> Result<RecommendationResult, RecommendError>
    where
        F: FnMut(&GenerationSnapshot<'_>),
    {
        let span = info_span!(
            "recommend",
            seed = %seed,
            population_size = self.config.population_size(),
            num_exercises = self.config.num_exercises(),
        );
        let _enter = span.enter();

        let mut rng = Pcg32::seed_from_u64(seed.0);
        let mut result = self.run(&mut rng, cancel, observer)?;
        result.diagnostics.seed = Some(seed);
        Ok(result)
    }

    /// Drives the state machine with a caller-supplied generator.
    ///
    /// `observer` is called once per evaluated generation, after the convergence check.
    pub fn run<R, F>(
        &self,
        rng: &mut R,
        cancel: &CancellationToken,
        mut observer: F,
    ) -> Result<RecommendationResult, RecommendError>
    where
        R: Rng + ?Sized,
        F: FnMut(&GenerationSnapshot<'_>),
    {
        let start = Instant::now();
        let deadline = self.config.deadline().map(|budget| start + budget);

        let ops = Operators::new(self.catalog, self.profile, self.config);
        if ops.evaluator.is_weakness_neutral() {
            warn!("no weak skill is covered by the active catalog, using neutral weakness score");
        }
        let mut monitor = ConvergenceMonitor::from_config(self.config);

        let mut population = Population::initialize(
            &ops.weights,
            self.config.population_size(),
            self.config.num_exercises(),
            rng,
        )?;
        let mut best: Option<Individual> = None;
        let mut generation = 0;
        let mut state = RunState::Initialized;

        let reason = loop {
            state = match state {
                RunState::Initialized => RunState::Evaluating,
                RunState::Evaluating => {
                    population.evaluate_fitness(&ops.evaluator);
                    if let Some(leader) = population.best()
                        && best.as_ref().is_none_or(|b| leader.score() > b.score())
                    {
                        best = Some(leader.clone());
                    }

                    let stats = population.compute_fitness_stats();
                    let mean = stats.as_ref().map_or(0.0, |s| s.mean);
                    let variance = stats.as_ref().map_or(0.0, |s| s.variance);
                    let best_score = best.as_ref().map_or(0.0, Individual::score);
                    let verdict = monitor.observe(generation, best_score, variance);
                    debug!(
                        generation,
                        best = monitor.best_fitness(),
                        mean,
                        variance,
                        stagnant = monitor.stagnant_generations(),
                        "generation evaluated"
                    );
                    observer(&GenerationSnapshot {
                        generation,
                        best_fitness: monitor.best_fitness(),
                        mean_fitness: mean,
                        variance,
                        stagnant_generations: monitor.stagnant_generations(),
                        population: &population,
                    });

                    let stop = verdict
                        .or_else(|| self.checkpoint(generation, cancel, deadline));
                    match stop {
                        Some(reason) => RunState::Converged(reason),
                        None => RunState::Evolving,
                    }
                }
                RunState::Evolving => {
                    let progress = monitor.state(generation);
                    population = ops.next_generation(&population, &progress, rng);
                    generation += 1;
                    RunState::Evaluating
                }
                RunState::Converged(reason) => {
                    if matches!(
                        reason,
                        TerminationReason::Deadline | TerminationReason::Cancelled
                    ) {
                        warn!(generation, %reason, "run cut short, returning best so far");
                    }
                    RunState::Terminated(reason)
                }
                RunState::Terminated(reason) => break reason,
            };
        };

        info!(
            reason = %reason,
            generations = generation,
            best_fitness = monitor.best_fitness(),
            "recommendation finished"
        );
        Ok(self.finish(population, best, &monitor, generation, reason, start))
    }

    /// Stop conditions other than convergence, in precedence order.
    fn checkpoint(
        &self,
        generation: usize,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Option<TerminationReason> {
        if generation >= self.config.generations() {
            Some(TerminationReason::MaxGenerations)
        } else if cancel.is_cancelled() {
            Some(TerminationReason::Cancelled)
        } else if deadline.is_some_and(|d| Instant::now() >= d) {
            Some(TerminationReason::Deadline)
        } else {
            None
        }
    }

    fn finish(
        &self,
        mut population: Population,
        best: Option<Individual>,
        monitor: &ConvergenceMonitor,
        generations: usize,
        termination_reason: TerminationReason,
        start: Instant,
    ) -> RecommendationResult {
        population.extend(best);
        population.rank();
        let mut top = population
            .top_distinct(self.config.num_results())
            .into_iter()
            .map(Recommendation::from_individual);
        let winner = top.next().unwrap_or_else(|| Recommendation {
            exercises: Vec::new(),
            fitness: FitnessComponents::new(0.0, 0.0, 0.0),
        });
        let alternatives = top.collect();

        let history = monitor.history().to_vec();
        let initial = history.first().copied().unwrap_or(0.0);
        let final_best = monitor.best_fitness();
        let statistics = RunStatistics {
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            initial_best_fitness: initial,
            final_best_fitness: final_best,
            improvement_percent: (final_best - initial) / initial.max(0.001) * 100.0,
            last_improvement_generation: monitor.last_improvement_generation(),
            best_fitness_history: history,
        };

        RecommendationResult {
            exercises: winner.exercises,
            fitness: winner.fitness,
            alternatives,
            diagnostics: RunDiagnostics {
                generations,
                termination_reason,
                seed: None,
                statistics,
            },
        }
    }
}

/// The per-run operator set, built once from the configuration.
struct Operators<'a> {
    weights: SamplingWeights<'a>,
    evaluator: FitnessEvaluator<'a>,
    selection: WeaknessBiasedSelection<'a>,
    crossover: UniformCrossover,
    mutation: AdaptiveMutation,
    elitism: Elitism,
}

impl<'a> Operators<'a> {
    fn new(catalog: &'a ExerciseCatalog, profile: &'a WeaknessProfile, config: &GaConfig) -> Self {
        let weights = SamplingWeights::new(catalog, profile);
        Self {
            weights,
            evaluator: FitnessEvaluator::new(catalog, profile, config.num_exercises()),
            selection: WeaknessBiasedSelection::new(&weights),
            crossover: UniformCrossover::new(config.crossover_rate()),
            mutation: AdaptiveMutation::new(
                config.mutation_base_rate(),
                config.convergence_patience(),
                catalog,
            ),
            elitism: Elitism::new(config.elite_count()),
        }
    }

    /// Selection, crossover, mutation and elitism over an evaluated, ranked population.
    fn next_generation<R>(
        &self,
        parents: &Population,
        progress: &GenerationState,
        rng: &mut R,
    ) -> Population
    where
        R: Rng + ?Sized,
    {
        let individuals = parents.individuals();
        let size = individuals.len();
        let pairs = self
            .selection
            .select_pairs(individuals, size.div_ceil(2), rng);

        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (a, b) in pairs {
            let (a, b) = (&individuals[a], &individuals[b]);
            children.push(self.crossover.offspring(a, b, &self.weights, rng));
            children.push(self.crossover.offspring(b, a, &self.weights, rng));
        }
        children.truncate(size);

        let mut mutated = 0;
        for child in &mut children {
            mutated += self.mutation.mutate(child, &self.weights, progress, rng);
        }
        debug!(generation = progress.generation, mutated, "offspring generated");

        let mut offspring = Population::from_individuals(children);
        offspring.evaluate_fitness(&self.evaluator);
        self.elitism.apply(parents, offspring)
    }
}
