//! Run parameters and their one-time validation.
//!
//! [`GaParams`] is the loosely-specified, serde-friendly form supplied by callers (every
//! field has a default). [`GaConfig`] is the validated, immutable value the engine runs
//! on; it can only be obtained through [`GaConfig::new`].

use std::{fmt, str::FromStr, time::Duration};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parameter constraint violations, reported before any generation runs.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("population_size must be at least 2 (got {population_size})")]
    PopulationTooSmall { population_size: usize },
    #[display("num_exercises must be at least 1")]
    NoExercisesRequested,
    #[display("generations must be at least 1")]
    NoGenerations,
    #[display("elite_count {elite_count} exceeds population_size {population_size}")]
    TooManyElites {
        elite_count: usize,
        population_size: usize,
    },
    #[display("{name} must be within [0, 1] (got {value})")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[display("convergence_patience must be at least 1")]
    ZeroPatience,
    #[display("{name} must be a finite non-negative number (got {value})")]
    NegativeThreshold { name: &'static str, value: f32 },
    #[display("num_results must be within [1, population_size] (got {num_results})")]
    InvalidResultCount { num_results: usize },
    #[display("num_exercises {requested} exceeds the {available} active catalog exercises")]
    NotEnoughExercises { requested: usize, available: usize },
}

/// Seed for a reproducible GA run.
///
/// Serialized as a 16-character lowercase hex string.
///
/// # Example
///
/// ```
/// use exreco_ga::config::RunSeed;
///
/// let seed: RunSeed = "000000000000002a".parse().unwrap();
/// assert_eq!(seed, RunSeed(42));
/// assert_eq!(seed.to_string(), "000000000000002a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunSeed(pub u64);

impl fmt::Display for RunSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed `{input}`: expected 1 to 16 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for RunSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > 16 {
            return Err(ParseSeedError {
                input: s.to_owned(),
            });
        }
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| ParseSeedError {
                input: s.to_owned(),
            })
    }
}

impl Serialize for RunSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows drawing a fresh seed with `rng.random()`.
impl Distribution<RunSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RunSeed {
        RunSeed(rng.random())
    }
}

/// Caller-supplied GA parameters. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaParams {
    /// Individuals per generation.
    pub population_size: usize,
    /// Exercises in each recommendation.
    pub num_exercises: usize,
    /// Maximum number of evolution steps.
    pub generations: usize,
    /// Parents carried into the next generation unchanged.
    pub elite_count: usize,
    /// Probability that an offspring is recombined rather than copied from one parent.
    pub crossover_rate: f32,
    /// Per-gene replacement probability before stagnation and utility adjustments.
    pub mutation_base_rate: f32,
    /// Generations without improvement before the run is declared converged.
    pub convergence_patience: usize,
    /// Smallest best-fitness gain that counts as an improvement.
    pub convergence_epsilon: f32,
    /// Population fitness variance below which the population counts as homogeneous.
    pub variance_threshold: f32,
    /// How many distinct recommendations to return (the best one included).
    pub num_results: usize,
    /// Wall-clock budget for the run, in milliseconds.
    pub deadline_ms: Option<u64>,
    /// Fixed seed for a reproducible run; a fresh one is drawn when absent.
    pub random_seed: Option<RunSeed>,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            num_exercises: 5,
            generations: 100,
            elite_count: 5,
            crossover_rate: 0.9,
            mutation_base_rate: 0.1,
            convergence_patience: 10,
            convergence_epsilon: 1e-6,
            variance_threshold: 1e-6,
            num_results: 1,
            deadline_ms: None,
            random_seed: None,
        }
    }
}

/// Validated, immutable GA configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    params: GaParams,
}

impl GaConfig {
    /// Validates `params` against every catalog-independent constraint.
    ///
    /// `elite_count == population_size` is accepted: it freezes the population, which is
    /// occasionally useful for diagnostics.
    pub fn new(params: GaParams) -> Result<Self, ConfigurationError> {
        if params.population_size < 2 {
            return Err(ConfigurationError::PopulationTooSmall {
                population_size: params.population_size,
            });
        }
        if params.num_exercises == 0 {
            return Err(ConfigurationError::NoExercisesRequested);
        }
        if params.generations == 0 {
            return Err(ConfigurationError::NoGenerations);
        }
        if params.elite_count > params.population_size {
            return Err(ConfigurationError::TooManyElites {
                elite_count: params.elite_count,
                population_size: params.population_size,
            });
        }
        check_rate("crossover_rate", params.crossover_rate)?;
        check_rate("mutation_base_rate", params.mutation_base_rate)?;
        if params.convergence_patience == 0 {
            return Err(ConfigurationError::ZeroPatience);
        }
        check_threshold("convergence_epsilon", params.convergence_epsilon)?;
        check_threshold("variance_threshold", params.variance_threshold)?;
        if params.num_results == 0 || params.num_results > params.population_size {
            return Err(ConfigurationError::InvalidResultCount {
                num_results: params.num_results,
            });
        }
        Ok(Self { params })
    }

    /// Checks the one constraint that depends on the catalog.
    pub fn check_catalog(&self, active_exercises: usize) -> Result<(), ConfigurationError> {
        if self.params.num_exercises > active_exercises {
            return Err(ConfigurationError::NotEnoughExercises {
                requested: self.params.num_exercises,
                available: active_exercises,
            });
        }
        Ok(())
    }

    /// The validated parameters.
    #[must_use]
    pub fn params(&self) -> &GaParams {
        &self.params
    }

    /// Individuals per generation, at least 2.
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.params.population_size
    }

    /// Length of every individual's gene sequence.
    #[must_use]
    pub fn num_exercises(&self) -> usize {
        self.params.num_exercises
    }

    /// Hard cap on the number of evolution steps.
    #[must_use]
    pub fn generations(&self) -> usize {
        self.params.generations
    }

    /// Parents preserved per generation, at most `population_size`.
    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.params.elite_count
    }

    /// Per-offspring crossover probability in [0, 1].
    #[must_use]
    pub fn crossover_rate(&self) -> f32 {
        self.params.crossover_rate
    }

    /// Base per-gene mutation probability in [0, 1].
    #[must_use]
    pub fn mutation_base_rate(&self) -> f32 {
        self.params.mutation_base_rate
    }

    /// Stagnant generations tolerated before a plateau stops the run.
    #[must_use]
    pub fn convergence_patience(&self) -> usize {
        self.params.convergence_patience
    }

    /// Minimum best-fitness gain counted as progress.
    #[must_use]
    pub fn convergence_epsilon(&self) -> f32 {
        self.params.convergence_epsilon
    }

    /// Fitness variance below which the population is treated as converged.
    #[must_use]
    pub fn variance_threshold(&self) -> f32 {
        self.params.variance_threshold
    }

    /// Number of distinct recommendations returned, best included.
    #[must_use]
    pub fn num_results(&self) -> usize {
        self.params.num_results
    }

    /// Wall-clock budget, checked between generations.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.params.deadline_ms.map(Duration::from_millis)
    }

    /// Seed requested by the caller, if any.
    #[must_use]
    pub fn random_seed(&self) -> Option<RunSeed> {
        self.params.random_seed
    }
}

fn check_rate(name: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::RateOutOfRange { name, value })
    }
}

fn check_threshold(name: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NegativeThreshold { name, value })
    }
}
