//! Read-only inputs of a recommendation run: the exercise catalog and the learner's
//! weakness profile.
//!
//! Both types are validated on construction and expose no mutating methods, so a run that
//! borrows them sees one consistent snapshot for its whole duration. Callers that refresh
//! catalogs concurrently should build a new [`ExerciseCatalog`] and swap it behind an
//! `Arc` rather than editing one in place.

pub use self::{catalog::*, exercise::*, profile::*};

mod catalog;
mod exercise;
mod profile;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CatalogError {
    #[display("duplicate exercise id {id} in catalog")]
    DuplicateExerciseId { id: ExerciseId },
    #[display("exercise {id} has an empty skill tag")]
    EmptySkillTag { id: ExerciseId },
    #[display("exercise {id} has a non-finite utility score")]
    InvalidUtility { id: ExerciseId },
    #[display("severity {severity} for skill `{skill}` is outside [0, 1]")]
    InvalidSeverity { skill: SkillTag, severity: f32 },
}
