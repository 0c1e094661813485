//! JSON documents read and written by the CLI.

use chrono::{DateTime, Utc};
use exreco_catalog::{ExerciseCatalog, WeaknessProfile};
use exreco_ga::{GaParams, RecommendationAnalysis, RecommendationResult};
use serde::{Deserialize, Serialize};

/// Input of `exreco recommend`.
///
/// `profile` and `params` may be omitted; an empty profile is a valid request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRequest {
    pub catalog: ExerciseCatalog,
    #[serde(default)]
    pub profile: WeaknessProfile,
    #[serde(default)]
    pub params: GaParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub generated_at: DateTime<Utc>,
    pub result: RecommendationResult,
    pub analysis: RecommendationAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{ "catalog": [ { "id": 1, "skill": "algebra" }, { "id": 2, "skill": "reading" } ] }"#,
        )
        .unwrap();
        assert_eq!(request.catalog.len(), 2);
        assert!(request.profile.is_empty());
        assert_eq!(request.params, GaParams::default());
    }

    #[test]
    fn test_request_rejects_duplicate_ids() {
        let err = serde_json::from_str::<RecommendationRequest>(
            r#"{ "catalog": [ { "id": 1, "skill": "algebra" }, { "id": 1, "skill": "reading" } ] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate exercise id"));
    }

    #[test]
    fn test_request_rejects_unknown_params() {
        let result = serde_json::from_str::<RecommendationRequest>(
            r#"{ "catalog": [], "params": { "population": 10 } }"#,
        );
        assert!(result.is_err());
    }
}
