//! Genetic-algorithm engine that recommends practice exercises for a learner.
//!
//! Given an [`ExerciseCatalog`](exreco_catalog::ExerciseCatalog), a
//! [`WeaknessProfile`](exreco_catalog::WeaknessProfile) and a validated [`GaConfig`], the
//! engine evolves fixed-length, duplicate-free exercise sequences toward sets that target
//! the learner's weak skills, stay varied, and match difficulty to how weak each skill is.
//!
//! # How a Run Works
//!
//! 1. **Initialization** - Sample `population_size` individuals, each drawing
//!    `num_exercises` distinct exercises weighted by skill severity ([`weighting`])
//! 2. **Evaluation** - Score every individual in parallel ([`fitness`]); all scores are in
//!    before anything else reads them
//! 3. **Convergence check** - Stop on a fitness plateau, a homogeneous population, the
//!    generation cap, a deadline or cancellation ([`convergence`])
//! 4. **Selection** - Draw parent pairs by fitness, biased toward weak skills that
//!    earlier picks left uncovered ([`selection`])
//! 5. **Crossover** - Uniform crossover with duplicate repair ([`crossover`])
//! 6. **Mutation** - Per-gene replacement whose rate rises with stagnation and for
//!    low-utility exercises ([`mutation`])
//! 7. **Elitism** - The best parents overwrite the worst offspring ([`elitism`]), then
//!    back to step 2
//!
//! # Architecture
//!
//! ```text
//! GaParams ──validate──→ GaConfig
//!                           ↓
//! ExerciseCatalog ─┐    Recommender (state machine)
//! WeaknessProfile ─┴──→     ↓ drives
//!                       Population ⇄ Selection → Crossover → Mutation → Elitism
//!                           ↓ scored by
//!                       FitnessEvaluator
//!                           ↓ watched by
//!                       ConvergenceMonitor
//!                           ↓
//!                       RecommendationResult ──→ RecommendationAnalysis
//! ```
//!
//! # Fitness
//!
//! ```text
//! fitness = 0.7 × weakness + 0.2 × diversity + 0.1 × difficulty      (each in [0, 1])
//! ```
//!
//! An empty profile, or one whose weak skills have no active exercise, is not an error:
//! the weakness term falls back to a neutral constant and the other two terms decide.
//!
//! # Determinism
//!
//! All randomness flows through one generator per run. With a fixed
//! [`RunSeed`](config::RunSeed), identical inputs yield an identical result; only the
//! fitness evaluation is parallel, and it consumes no randomness.
//!
//! # Example
//!
//! ```rust,ignore
//! use exreco_catalog::{Difficulty, Exercise, ExerciseCatalog, WeaknessProfile};
//! use exreco_ga::{GaConfig, GaParams, Recommender};
//!
//! let catalog = ExerciseCatalog::new(vec![
//!     Exercise::new(1, "algebra", Difficulty::Easy),
//!     Exercise::new(2, "geometry", Difficulty::Hard),
//!     Exercise::new(3, "reading", Difficulty::Medium),
//! ])?;
//! let profile = WeaknessProfile::new([("algebra", 0.8)])?;
//! let config = GaConfig::new(GaParams { num_exercises: 2, ..GaParams::default() })?;
//!
//! let result = Recommender::new(&catalog, &profile, &config)?.recommend()?;
//! println!("{:?} scored {}", result.exercises, result.fitness.combined);
//! ```

pub use self::{
    analysis::RecommendationAnalysis,
    config::{ConfigurationError, GaConfig, GaParams, RunSeed},
    convergence::TerminationReason,
    recommender::{CancellationToken, RecommendationResult, Recommender},
};

pub mod analysis;
pub mod config;
pub mod convergence;
pub mod crossover;
pub mod elitism;
pub mod fitness;
pub mod mutation;
pub mod population;
pub mod recommender;
pub mod selection;
pub mod weighting;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RecommendError {
    #[display("invalid configuration: {_0}")]
    Configuration(ConfigurationError),
    #[display("catalog has no active exercises")]
    EmptyCatalog,
}

impl From<ConfigurationError> for RecommendError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}
