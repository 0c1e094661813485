use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of an exercise within a catalog.
///
/// Ordering on ids is the deterministic tie-breaker used throughout the GA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub u32);

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of the skill an exercise trains (e.g. `"algebra"`, `"reading"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillTag(String);

impl SkillTag {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Difficulty level of an exercise, ordered `Easy < Medium < Hard`.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[display("easy")]
    Easy,
    #[default]
    #[display("medium")]
    Medium,
    #[display("hard")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];
}

const fn default_utility() -> f32 {
    0.5
}

const fn default_active() -> bool {
    true
}

/// A single practice exercise.
///
/// `utility` is the historical effectiveness of the exercise (higher is better). Inactive
/// exercises stay in the catalog for reference but are never recommended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub skill: SkillTag,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_utility")]
    pub utility: f32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Exercise {
    /// Creates an active exercise with the default utility and no display name.
    #[must_use]
    pub fn new(id: u32, skill: impl Into<SkillTag>, difficulty: Difficulty) -> Self {
        Self {
            id: ExerciseId(id),
            name: None,
            skill: skill.into(),
            difficulty,
            utility: default_utility(),
            active: true,
        }
    }

    #[must_use]
    pub fn with_utility(mut self, utility: f32) -> Self {
        self.utility = utility;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns the display name, falling back to a generated one.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Exercise {}", self.id.0))
    }
}
