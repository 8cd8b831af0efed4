//! Onboarding - store the profile and the first coach protocol

use anyhow::Result;
use tracing::info;

use crate::coach::Coach;
use crate::db::Database;
use crate::exercises::Goal;
use crate::profile::Profile;
use crate::screen::Screen;

/// Persist goal and level, generate the protocol and store it.
/// The gateway never fails, so only storage errors propagate.
pub async fn initialize(db: &Database, coach: &Coach, goal: Goal, level: u8) -> Result<Screen> {
    let profile = Profile::new(goal, level);
    db.save_profile(&profile)?;
    info!(goal = %goal, level, tier = profile.tier().routine_label(), "Profile saved");

    let plan = coach.generate_workout_plan(goal, level).await;
    db.save_plan(&plan)?;
    info!(chars = plan.len(), "Protocol stored");

    Ok(Screen::Tracker)
}
