use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CatalogError, SkillTag};

/// A learner's weakness per skill, as a severity in `[0, 1]` (1 = maximally weak).
///
/// Skills missing from the profile have severity 0. An empty profile is valid; the GA
/// treats it as "no weakness information" and falls back to neutral weakness scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<SkillTag, f32>",
    into = "BTreeMap<SkillTag, f32>"
)]
pub struct WeaknessProfile {
    severities: BTreeMap<SkillTag, f32>,
}

impl WeaknessProfile {
    pub fn new<I, S>(severities: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<SkillTag>,
    {
        let mut map = BTreeMap::new();
        for (skill, severity) in severities {
            let skill = skill.into();
            if !(0.0..=1.0).contains(&severity) {
                return Err(CatalogError::InvalidSeverity { skill, severity });
            }
            map.insert(skill, severity);
        }
        Ok(Self { severities: map })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.severities.is_empty()
    }

    /// Returns the severity for `skill`, or 0 if the skill is not in the profile.
    #[must_use]
    pub fn severity(&self, skill: &SkillTag) -> f32 {
        self.severities.get(skill).copied().unwrap_or(0.0)
    }

    /// Iterates over `(skill, severity)` in skill order.
    pub fn iter(&self) -> impl Iterator<Item = (&SkillTag, f32)> + '_ {
        self.severities.iter().map(|(k, v)| (k, *v))
    }

    /// Iterates over skills with a strictly positive severity.
    pub fn weak_skills(&self) -> impl Iterator<Item = (&SkillTag, f32)> + '_ {
        self.iter().filter(|(_, s)| *s > 0.0)
    }

    #[must_use]
    pub fn total_severity(&self) -> f32 {
        self.severities.values().sum()
    }
}

impl TryFrom<BTreeMap<SkillTag, f32>> for WeaknessProfile {
    type Error = CatalogError;

    fn try_from(severities: BTreeMap<SkillTag, f32>) -> Result<Self, Self::Error> {
        Self::new(severities)
    }
}

impl From<WeaknessProfile> for BTreeMap<SkillTag, f32> {
    fn from(profile: WeaknessProfile) -> Self {
        profile.severities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_skill_has_zero_severity() {
        let profile = WeaknessProfile::new([("algebra", 0.8)]).unwrap();
        assert_eq!(profile.severity(&SkillTag::from("algebra")), 0.8);
        assert_eq!(profile.severity(&SkillTag::from("geometry")), 0.0);
    }

    #[test]
    fn test_rejects_out_of_range_severity() {
        let err = WeaknessProfile::new([("algebra", 1.5)]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSeverity { .. }));
        assert!(WeaknessProfile::new([("algebra", f32::NAN)]).is_err());
    }

    #[test]
    fn test_weak_skills_skip_zero() {
        let profile = WeaknessProfile::new([("a", 0.0), ("b", 0.4), ("c", 1.0)]).unwrap();
        let weak: Vec<_> = profile.weak_skills().map(|(s, _)| s.as_str()).collect();
        assert_eq!(weak, ["b", "c"]);
        assert!((profile.total_severity() - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_deserialize_validates() {
        let profile: WeaknessProfile = serde_json::from_str(r#"{"reading": 0.4}"#).unwrap();
        assert!(!profile.is_empty());
        assert!(serde_json::from_str::<WeaknessProfile>(r#"{"reading": -0.1}"#).is_err());
        assert!(WeaknessProfile::default().is_empty());
    }
}
