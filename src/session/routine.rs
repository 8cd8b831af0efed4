//! Routine recommendation from goal and experience level

use tracing::debug;

use super::ActiveExercise;
use crate::exercises::{ExerciseDefinition, MuscleGroup, get_all_exercises};
use crate::profile::Profile;

/// Upper bound on exercises in a recommended routine
pub const ROUTINE_SIZE: usize = 5;

/// Whether a catalog entry fits the profile's goal and tier
pub fn is_eligible(exercise: &ExerciseDefinition, profile: &Profile) -> bool {
    let goal_match =
        exercise.supports_goal(profile.goal) || exercise.muscle == MuscleGroup::FullBody;
    goal_match && profile.tier().admits(exercise.difficulty)
}

/// First eligible catalog entries, catalog order preserved
pub fn recommend(profile: &Profile) -> Vec<&'static ExerciseDefinition> {
    let picked: Vec<_> = get_all_exercises()
        .iter()
        .filter(|e| is_eligible(e, profile))
        .take(ROUTINE_SIZE)
        .collect();

    debug!(
        goal = %profile.goal,
        tier = profile.tier().routine_label(),
        count = picked.len(),
        "Recommended routine"
    );
    picked
}

/// Fresh routine with empty set lists
pub fn build_routine(profile: &Profile) -> Vec<ActiveExercise> {
    recommend(profile)
        .into_iter()
        .map(ActiveExercise::new)
        .collect()
}
