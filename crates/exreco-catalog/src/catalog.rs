use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, Exercise, ExerciseId};

/// An ordered, validated collection of exercises.
///
/// Construction rejects duplicate ids, empty skill tags and non-finite utility scores.
/// The catalog is immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Exercise>", into = "Vec<Exercise>")]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    index: HashMap<ExerciseId, usize>,
}

impl ExerciseCatalog {
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(exercises.len());
        for (i, exercise) in exercises.iter().enumerate() {
            if exercise.skill.as_str().trim().is_empty() {
                return Err(CatalogError::EmptySkillTag { id: exercise.id });
            }
            if !exercise.utility.is_finite() {
                return Err(CatalogError::InvalidUtility { id: exercise.id });
            }
            if index.insert(exercise.id, i).is_some() {
                return Err(CatalogError::DuplicateExerciseId { id: exercise.id });
            }
        }
        Ok(Self { exercises, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Returns all exercises in catalog order, including inactive ones.
    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn get(&self, id: ExerciseId) -> Option<&Exercise> {
        self.index.get(&id).map(|&i| &self.exercises[i])
    }

    /// Returns `true` if `id` is in the catalog and currently active.
    #[must_use]
    pub fn is_active(&self, id: ExerciseId) -> bool {
        self.get(id).is_some_and(|e| e.active)
    }

    /// Iterates over active exercises in catalog order.
    pub fn active(&self) -> impl Iterator<Item = &Exercise> + '_ {
        self.exercises.iter().filter(|e| e.active)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Returns the `(min, max)` utility over active exercises.
    #[must_use]
    pub fn utility_range(&self) -> Option<(f32, f32)> {
        self.active().map(|e| e.utility).fold(None, |acc, u| match acc {
            None => Some((u, u)),
            Some((lo, hi)) => Some((lo.min(u), hi.max(u))),
        })
    }
}

impl TryFrom<Vec<Exercise>> for ExerciseCatalog {
    type Error = CatalogError;

    fn try_from(exercises: Vec<Exercise>) -> Result<Self, Self::Error> {
        Self::new(exercises)
    }
}

impl From<ExerciseCatalog> for Vec<Exercise> {
    fn from(catalog: ExerciseCatalog) -> Self {
        catalog.exercises
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;

    fn sample() -> Vec<Exercise> {
        vec![
            Exercise::new(1, "algebra", Difficulty::Easy).with_utility(0.2),
            Exercise::new(2, "geometry", Difficulty::Hard).with_utility(0.9),
            Exercise::new(3, "algebra", Difficulty::Medium).inactive(),
        ]
    }

    #[test]
    fn test_lookup_and_active_filter() {
        let catalog = ExerciseCatalog::new(sample()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.active_count(), 2);
        assert!(catalog.is_active(ExerciseId(1)));
        assert!(!catalog.is_active(ExerciseId(3)));
        assert!(!catalog.is_active(ExerciseId(99)));
        assert_eq!(
            catalog.get(ExerciseId(2)).map(|e| e.difficulty),
            Some(Difficulty::Hard)
        );
    }

    #[test]
    fn test_utility_range_ignores_inactive() {
        let mut exercises = sample();
        exercises[2].utility = 5.0;
        let catalog = ExerciseCatalog::new(exercises).unwrap();
        assert_eq!(catalog.utility_range(), Some((0.2, 0.9)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut exercises = sample();
        exercises.push(Exercise::new(2, "reading", Difficulty::Easy));
        let err = ExerciseCatalog::new(exercises).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateExerciseId { id: ExerciseId(2) });
    }

    #[test]
    fn test_rejects_empty_skill_and_bad_utility() {
        let err = ExerciseCatalog::new(vec![Exercise::new(1, " ", Difficulty::Easy)]).unwrap_err();
        assert_eq!(err, CatalogError::EmptySkillTag { id: ExerciseId(1) });

        let err = ExerciseCatalog::new(vec![
            Exercise::new(1, "algebra", Difficulty::Easy).with_utility(f32::NAN),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::InvalidUtility { id: ExerciseId(1) });
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[{"id": 1, "skill": "a"}, {"id": 1, "skill": "b"}]"#;
        assert!(serde_json::from_str::<ExerciseCatalog>(json).is_err());

        let json = r#"[{"id": 1, "skill": "a"}, {"id": 2, "skill": "b", "active": false}]"#;
        let catalog: ExerciseCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.active_count(), 1);
    }
}
