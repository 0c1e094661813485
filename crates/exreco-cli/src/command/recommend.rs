use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use exreco_ga::{GaConfig, GaParams, RecommendationAnalysis, Recommender, RunSeed};
use tracing::info;

use crate::{
    schema::{RecommendationRequest, RecommendationResponse},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct RecommendArg {
    /// Request file holding the catalog, the weakness profile and GA parameters
    #[arg(long)]
    input: PathBuf,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Random seed in hex, for reproducible runs
    #[arg(long)]
    seed: Option<RunSeed>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// Number of exercises per recommendation
    #[arg(long)]
    num_exercises: Option<usize>,
    #[arg(long)]
    elite_count: Option<usize>,
    /// Number of distinct recommendations to return
    #[arg(long)]
    num_results: Option<usize>,
    /// Wall-clock budget in milliseconds; the best result so far is returned when it runs out
    #[arg(long)]
    deadline_ms: Option<u64>,
}

impl RecommendArg {
    /// Command-line flags take precedence over the request file.
    fn apply_overrides(&self, params: &mut GaParams) {
        let Self {
            input: _,
            output: _,
            seed,
            population_size,
            generations,
            num_exercises,
            elite_count,
            num_results,
            deadline_ms,
        } = self;
        if let Some(seed) = seed {
            params.random_seed = Some(*seed);
        }
        if let Some(n) = population_size {
            params.population_size = *n;
        }
        if let Some(n) = generations {
            params.generations = *n;
        }
        if let Some(n) = num_exercises {
            params.num_exercises = *n;
        }
        if let Some(n) = elite_count {
            params.elite_count = *n;
        }
        if let Some(n) = num_results {
            params.num_results = *n;
        }
        if let Some(ms) = deadline_ms {
            params.deadline_ms = Some(*ms);
        }
    }
}

pub(crate) fn run(arg: &RecommendArg) -> anyhow::Result<()> {
    let RecommendationRequest {
        catalog,
        profile,
        mut params,
    } = util::read_json_file("request", &arg.input)?;
    arg.apply_overrides(&mut params);

    let config = GaConfig::new(params).context("Invalid GA parameters")?;
    info!(
        exercises = catalog.len(),
        active = catalog.active_count(),
        weak_skills = profile.weak_skills().count(),
        "loaded request"
    );

    let result = Recommender::new(&catalog, &profile, &config)?.recommend()?;
    let analysis = RecommendationAnalysis::analyze(&result, &catalog, &profile);
    for advice in &analysis.advice {
        info!(%advice, "advice");
    }

    let response = RecommendationResponse {
        generated_at: Utc::now(),
        result,
        analysis,
    };
    Output::save_json(&response, arg.output.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_request_params() {
        let arg = RecommendArg {
            seed: Some(RunSeed(0xbeef)),
            num_exercises: Some(3),
            deadline_ms: Some(250),
            ..RecommendArg::default()
        };
        let mut params = GaParams {
            num_exercises: 8,
            generations: 40,
            ..GaParams::default()
        };
        arg.apply_overrides(&mut params);
        assert_eq!(params.random_seed, Some(RunSeed(0xbeef)));
        assert_eq!(params.num_exercises, 3);
        assert_eq!(params.generations, 40);
        assert_eq!(params.deadline_ms, Some(250));
    }
}
