//! Interactive terminal front-ends for the tracker and the coach chat

pub mod chat;
pub mod tracker;

pub use chat::run_coach;
pub use tracker::run_tracker;

use std::io::Write;

use crate::exercises::ExerciseDefinition;

/// One catalog row: id, name, muscle, difficulty
pub fn write_exercise(out: &mut impl Write, ex: &ExerciseDefinition) -> std::io::Result<()> {
    writeln!(
        out,
        "  {:10} {:22} {:10} {}",
        ex.id,
        ex.name,
        ex.muscle.name(),
        ex.difficulty.name()
    )
}
