//! Exercise definitions - static catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Training goals a user can pick during onboarding
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Goal {
    Strength,
    #[default]
    Hypertrophy,
    Endurance,
    #[serde(rename = "Fat Loss")]
    FatLoss,
}

impl Goal {
    pub fn name(&self) -> &'static str {
        match self {
            Goal::Strength => "Strength",
            Goal::Hypertrophy => "Hypertrophy",
            Goal::Endurance => "Endurance",
            Goal::FatLoss => "Fat Loss",
        }
    }

    pub fn all() -> &'static [Goal] {
        &[Goal::Strength, Goal::Hypertrophy, Goal::Endurance, Goal::FatLoss]
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown goal '{0}' (expected one of: Strength, Hypertrophy, Endurance, Fat Loss)")]
pub struct UnknownGoal(pub String);

impl FromStr for Goal {
    type Err = UnknownGoal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "strength" => Ok(Goal::Strength),
            "hypertrophy" => Ok(Goal::Hypertrophy),
            "endurance" => Ok(Goal::Endurance),
            "fatloss" => Ok(Goal::FatLoss),
            _ => Err(UnknownGoal(s.to_string())),
        }
    }
}

/// Primary muscle group of an exercise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Legs,
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Core,
    Cardio,
    FullBody, // catch-all, always eligible for recommendation
}

impl MuscleGroup {
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Triceps => "Triceps",
            MuscleGroup::Core => "Core",
            MuscleGroup::Cardio => "Cardio",
            MuscleGroup::FullBody => "Full Body",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

/// Strength sets carry weight x reps, cardio sets only a duration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Strength,
    Cardio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle: MuscleGroup,
    pub difficulty: Difficulty,
    pub modality: Modality,
    pub goals: &'static [Goal],
}

impl ExerciseDefinition {
    pub fn supports_goal(&self, goal: Goal) -> bool {
        self.goals.contains(&goal)
    }
}

pub const CATALOG: &[ExerciseDefinition] = &[
    ExerciseDefinition {
        id: "sq",
        name: "Barbell Squat",
        muscle: MuscleGroup::Legs,
        difficulty: Difficulty::Intermediate,
        modality: Modality::Strength,
        goals: &[Goal::Strength, Goal::Hypertrophy],
    },
    ExerciseDefinition {
        id: "bp",
        name: "Bench Press",
        muscle: MuscleGroup::Chest,
        difficulty: Difficulty::Intermediate,
        modality: Modality::Strength,
        goals: &[Goal::Strength, Goal::Hypertrophy],
    },
    ExerciseDefinition {
        id: "dl",
        name: "Deadlift",
        muscle: MuscleGroup::Back,
        difficulty: Difficulty::Advanced,
        modality: Modality::Strength,
        goals: &[Goal::Strength],
    },
    ExerciseDefinition {
        id: "ohp",
        name: "Overhead Press",
        muscle: MuscleGroup::Shoulders,
        difficulty: Difficulty::Intermediate,
        modality: Modality::Strength,
        goals: &[Goal::Strength],
    },
    ExerciseDefinition {
        id: "pull",
        name: "Pull Ups",
        muscle: MuscleGroup::Back,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Hypertrophy, Goal::Strength],
    },
    ExerciseDefinition {
        id: "db_curl",
        name: "Dumbbell Curl",
        muscle: MuscleGroup::Biceps,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Hypertrophy],
    },
    ExerciseDefinition {
        id: "tri_ext",
        name: "Tricep Extension",
        muscle: MuscleGroup::Triceps,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Hypertrophy],
    },
    ExerciseDefinition {
        id: "leg_press",
        name: "Leg Press",
        muscle: MuscleGroup::Legs,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Hypertrophy],
    },
    ExerciseDefinition {
        id: "lat_raise",
        name: "Lateral Raise",
        muscle: MuscleGroup::Shoulders,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Hypertrophy],
    },
    // Cardio
    ExerciseDefinition {
        id: "run",
        name: "Treadmill Run",
        muscle: MuscleGroup::Cardio,
        difficulty: Difficulty::Beginner,
        modality: Modality::Cardio,
        goals: &[Goal::Endurance, Goal::FatLoss],
    },
    ExerciseDefinition {
        id: "row",
        name: "Rowing Machine",
        muscle: MuscleGroup::FullBody,
        difficulty: Difficulty::Intermediate,
        modality: Modality::Cardio,
        goals: &[Goal::Endurance, Goal::FatLoss],
    },
    ExerciseDefinition {
        id: "burpees",
        name: "Burpees",
        muscle: MuscleGroup::FullBody,
        difficulty: Difficulty::Advanced,
        modality: Modality::Cardio,
        goals: &[Goal::FatLoss, Goal::Endurance],
    },
    ExerciseDefinition {
        id: "plank",
        name: "Plank",
        muscle: MuscleGroup::Core,
        difficulty: Difficulty::Beginner,
        modality: Modality::Strength,
        goals: &[Goal::Endurance, Goal::Strength],
    },
];

pub fn get_all_exercises() -> &'static [ExerciseDefinition] {
    CATALOG
}

pub fn find_exercise(id: &str) -> Option<&'static ExerciseDefinition> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Case-insensitive name search; an empty query returns the whole catalog
pub fn search(query: &str) -> Vec<&'static ExerciseDefinition> {
    if query.is_empty() {
        return CATALOG.iter().collect();
    }
    let needle = query.to_lowercase();
    CATALOG
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}
