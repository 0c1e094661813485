use std::path::PathBuf;

use exreco_catalog::{Difficulty, Exercise, ExerciseCatalog, WeaknessProfile};
use exreco_ga::GaParams;

use crate::{schema::RecommendationRequest, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SampleArg {
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SampleArg) -> anyhow::Result<()> {
    Output::save_json(&sample_request()?, arg.output.as_deref())
}

fn sample_request() -> anyhow::Result<RecommendationRequest> {
    let catalog = ExerciseCatalog::new(vec![
        Exercise::new(1, "reading", Difficulty::Easy)
            .with_name("Basic reading comprehension")
            .with_utility(0.6),
        Exercise::new(2, "writing", Difficulty::Medium)
            .with_name("Structured writing")
            .with_utility(0.7),
        Exercise::new(3, "reading", Difficulty::Hard)
            .with_name("Text analysis")
            .with_utility(0.8),
        Exercise::new(4, "writing", Difficulty::Hard)
            .with_name("Creative essays")
            .with_utility(0.5),
        Exercise::new(5, "memory", Difficulty::Medium)
            .with_name("Memory exercises")
            .with_utility(0.9),
        Exercise::new(6, "memory", Difficulty::Easy)
            .with_name("Word recall")
            .with_utility(0.4),
        Exercise::new(7, "writing", Difficulty::Easy)
            .with_name("Sentence building")
            .with_utility(0.6),
        Exercise::new(8, "reading", Difficulty::Medium)
            .with_name("Speed reading")
            .with_utility(0.3)
            .inactive(),
    ])?;
    let profile = WeaknessProfile::new([("reading", 0.4), ("writing", 0.6), ("memory", 0.5)])?;
    let params = GaParams {
        population_size: 30,
        generations: 50,
        num_exercises: 3,
        elite_count: 3,
        ..GaParams::default()
    };
    Ok(RecommendationRequest {
        catalog,
        profile,
        params,
    })
}

#[cfg(test)]
mod tests {
    use exreco_ga::{GaConfig, Recommender, RunSeed};

    use super::*;

    #[test]
    fn test_sample_request_runs() {
        let mut request = sample_request().unwrap();
        request.params.random_seed = Some(RunSeed(42));
        let config = GaConfig::new(request.params.clone()).unwrap();
        let result = Recommender::new(&request.catalog, &request.profile, &config)
            .unwrap()
            .recommend()
            .unwrap();
        assert_eq!(result.exercises.len(), 3);
    }

    #[test]
    fn test_sample_request_round_trips_through_json() {
        let request = sample_request().unwrap();
        let json = serde_json::to_string(&request).unwrap();
        let parsed: RecommendationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.catalog.exercises(), request.catalog.exercises());
        assert_eq!(parsed.profile, request.profile);
        assert_eq!(parsed.params, request.params);
    }
}
