//! User profile - goal and experience level chosen during onboarding

use serde::{Deserialize, Serialize};

use crate::exercises::{Difficulty, Goal};

/// Level assumed when nothing (or garbage) is stored
pub const DEFAULT_LEVEL: u8 = 50;

/// Three-tier bucketing of the 0-100 experience slider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExperienceTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceTier {
    pub fn from_level(level: u8) -> Self {
        if level < 25 {
            ExperienceTier::Beginner
        } else if level < 75 {
            ExperienceTier::Intermediate
        } else {
            ExperienceTier::Advanced
        }
    }

    /// Label used when filtering the catalog
    pub fn routine_label(&self) -> &'static str {
        self.difficulty().name()
    }

    /// Label used in the coach protocol prompt. The top tier reads "Elite" there.
    pub fn protocol_label(&self) -> &'static str {
        match self {
            ExperienceTier::Beginner => "Beginner",
            ExperienceTier::Intermediate => "Intermediate",
            ExperienceTier::Advanced => "Elite",
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            ExperienceTier::Beginner => Difficulty::Beginner,
            ExperienceTier::Intermediate => Difficulty::Intermediate,
            ExperienceTier::Advanced => Difficulty::Advanced,
        }
    }

    /// Whether an exercise of `difficulty` is suitable for this tier.
    /// Advanced admits everything, other tiers admit Beginner plus their own level.
    pub fn admits(&self, difficulty: Difficulty) -> bool {
        match self {
            ExperienceTier::Advanced => true,
            _ => difficulty == Difficulty::Beginner || difficulty == self.difficulty(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub goal: Goal,
    pub level: u8,
}

impl Profile {
    pub fn new(goal: Goal, level: u8) -> Self {
        Self { goal, level }
    }

    pub fn tier(&self) -> ExperienceTier {
        ExperienceTier::from_level(self.level)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            goal: Goal::default(),
            level: DEFAULT_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ExperienceTier::from_level(0), ExperienceTier::Beginner);
        assert_eq!(ExperienceTier::from_level(24), ExperienceTier::Beginner);
        assert_eq!(ExperienceTier::from_level(25), ExperienceTier::Intermediate);
        assert_eq!(ExperienceTier::from_level(74), ExperienceTier::Intermediate);
        assert_eq!(ExperienceTier::from_level(75), ExperienceTier::Advanced);
        assert_eq!(ExperienceTier::from_level(100), ExperienceTier::Advanced);
    }

    #[test]
    fn test_level_10_is_beginner() {
        let profile = Profile::new(Goal::Strength, 10);
        assert_eq!(profile.tier().routine_label(), "Beginner");
        assert_eq!(profile.tier().protocol_label(), "Beginner");
    }

    #[test]
    fn test_top_tier_labels_differ() {
        let tier = ExperienceTier::from_level(80);
        assert_eq!(tier.routine_label(), "Advanced");
        assert_eq!(tier.protocol_label(), "Elite");
    }

    #[test]
    fn test_admits() {
        let beginner = ExperienceTier::Beginner;
        assert!(beginner.admits(Difficulty::Beginner));
        assert!(!beginner.admits(Difficulty::Intermediate));
        assert!(!beginner.admits(Difficulty::Advanced));

        let mid = ExperienceTier::Intermediate;
        assert!(mid.admits(Difficulty::Beginner));
        assert!(mid.admits(Difficulty::Intermediate));
        assert!(!mid.admits(Difficulty::Advanced));

        let top = ExperienceTier::Advanced;
        assert!(top.admits(Difficulty::Beginner));
        assert!(top.admits(Difficulty::Intermediate));
        assert!(top.admits(Difficulty::Advanced));
    }

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.goal, Goal::Hypertrophy);
        assert_eq!(profile.level, 50);
    }
}
