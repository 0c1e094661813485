//! Human-oriented breakdown of a finished recommendation.

use std::collections::BTreeMap;

use exreco_catalog::{Difficulty, ExerciseCatalog, ExerciseId, SkillTag, WeaknessProfile};
use serde::Serialize;

use crate::recommender::RecommendationResult;

/// Mean difficulty below which more demanding work is suggested.
pub const EASY_SKEW_THRESHOLD: f32 = 0.3;
/// Mean difficulty above which consolidating basics is suggested.
pub const HARD_SKEW_THRESHOLD: f32 = 0.7;
/// Coverage under which a weak skill is called out.
pub const LOW_COVERAGE_THRESHOLD: f32 = 0.7;
/// Largest recommendation that still fits a single short daily session.
pub const SHORT_SESSION_EXERCISES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseDetail {
    pub id: ExerciseId,
    pub name: String,
    pub skill: SkillTag,
    pub difficulty: Difficulty,
    pub utility: f32,
}

/// How well one skill is represented in the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillBalance {
    pub skill: SkillTag,
    pub severity: f32,
    /// Recommended exercises targeting the skill.
    pub count: usize,
    /// Share of the skill's expected slots that were filled, in [0, 1].
    pub coverage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advice {
    #[display("mostly easy exercises (mean difficulty {mean_difficulty:.2}), add harder work")]
    AddHarderExercises { mean_difficulty: f32 },
    #[display("mostly hard exercises (mean difficulty {mean_difficulty:.2}), consolidate basics")]
    ConsolidateBasics { mean_difficulty: f32 },
    #[display("weak skill {skill} is under-covered ({:.0}%)", coverage * 100.0)]
    FocusSkill { skill: SkillTag, coverage: f32 },
    #[display("short daily sessions covering all {exercises} exercises")]
    DailyShortSessions { exercises: usize },
    #[display("split the {exercises} exercises into {sessions} sessions of 2-3 exercises")]
    SplitSessions { exercises: usize, sessions: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationAnalysis {
    pub exercises: Vec<ExerciseDetail>,
    /// Skills in the profile or the recommendation, most severe first.
    pub skill_balance: Vec<SkillBalance>,
    /// Mean difficulty with easy = 0, medium = 0.5, hard = 1.
    pub mean_difficulty: f32,
    pub advice: Vec<Advice>,
}

impl RecommendationAnalysis {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn analyze(
        result: &RecommendationResult,
        catalog: &ExerciseCatalog,
        profile: &WeaknessProfile,
    ) -> Self {
        let exercises = result
            .exercises
            .iter()
            .filter_map(|id| catalog.get(*id))
            .map(|e| ExerciseDetail {
                id: e.id,
                name: e.display_name(),
                skill: e.skill.clone(),
                difficulty: e.difficulty,
                utility: e.utility,
            })
            .collect::<Vec<_>>();

        let mut counts = profile
            .iter()
            .map(|(skill, _)| (skill.clone(), 0))
            .collect::<BTreeMap<_, usize>>();
        for detail in &exercises {
            *counts.entry(detail.skill.clone()).or_default() += 1;
        }

        let slots = result.exercises.len() as f32;
        let total_severity = profile.total_severity();
        let mut skill_balance = counts
            .into_iter()
            .map(|(skill, count)| {
                let severity = profile.severity(&skill);
                let coverage = if severity <= 0.0 || total_severity <= 0.0 {
                    1.0
                } else {
                    let expected = severity / total_severity * slots;
                    (count as f32 / expected).min(1.0)
                };
                SkillBalance {
                    skill,
                    severity,
                    count,
                    coverage,
                }
            })
            .collect::<Vec<_>>();
        skill_balance.sort_by(|a, b| {
            b.severity
                .total_cmp(&a.severity)
                .then_with(|| a.skill.cmp(&b.skill))
        });

        let mean_difficulty = if exercises.is_empty() {
            0.0
        } else {
            exercises
                .iter()
                .map(|e| difficulty_score(e.difficulty))
                .sum::<f32>()
                / exercises.len() as f32
        };

        let mut advice = Vec::new();
        if !exercises.is_empty() {
            if mean_difficulty < EASY_SKEW_THRESHOLD {
                advice.push(Advice::AddHarderExercises { mean_difficulty });
            } else if mean_difficulty > HARD_SKEW_THRESHOLD {
                advice.push(Advice::ConsolidateBasics { mean_difficulty });
            }
        }
        if let Some(least) = skill_balance
            .iter()
            .filter(|b| b.severity > 0.0 && b.coverage < LOW_COVERAGE_THRESHOLD)
            .min_by(|a, b| a.coverage.total_cmp(&b.coverage))
        {
            advice.push(Advice::FocusSkill {
                skill: least.skill.clone(),
                coverage: least.coverage,
            });
        }
        let n = exercises.len();
        if n <= SHORT_SESSION_EXERCISES {
            advice.push(Advice::DailyShortSessions { exercises: n });
        } else {
            advice.push(Advice::SplitSessions {
                exercises: n,
                sessions: n.div_ceil(SHORT_SESSION_EXERCISES),
            });
        }

        Self {
            exercises,
            skill_balance,
            mean_difficulty,
            advice,
        }
    }
}

fn difficulty_score(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 0.0,
        Difficulty::Medium => 0.5,
        Difficulty::Hard => 1.0,
    }
}
