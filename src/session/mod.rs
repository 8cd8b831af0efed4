//! Workout session - routine, set logging, editing and completion
//!
//! The routine is the single source of truth for logged sets. History views
//! and edit drafts address it by exercise id and set id instead of holding
//! their own copies.

pub mod routine;
pub mod timer;

pub use routine::{build_routine, recommend};
pub use timer::{Ticker, Timer, format_elapsed};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::exercises::{ExerciseDefinition, Modality, find_exercise};
use crate::profile::Profile;
use crate::screen::Screen;

/// Input values loaded when an exercise is expanded
pub const DEFAULT_WEIGHT: f64 = 50.0;
pub const DEFAULT_REPS: i32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Unknown exercise '{0}'")]
    UnknownExercise(String),
    #[error("{0} is already in the routine")]
    AlreadyInRoutine(String),
    #[error("{0} is not in the routine")]
    NotInRoutine(String),
    #[error("No set {set_id} for {exercise_id}")]
    UnknownSet { exercise_id: String, set_id: u64 },
    #[error("No set is being edited")]
    NotEditing,
    #[error("Log some sets first")]
    NothingLogged,
}

/// One logged set. Cardio sets carry zero weight and reps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub id: u64,
    pub weight: f64,
    pub reps: i32,
    pub duration_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl SetRecord {
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveExercise {
    pub definition: &'static ExerciseDefinition,
    pub sets: Vec<SetRecord>,
}

impl ActiveExercise {
    pub fn new(definition: &'static ExerciseDefinition) -> Self {
        Self {
            definition,
            sets: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn modality(&self) -> Modality {
        self.definition.modality
    }

    /// Sum of weight x reps over this exercise's sets
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(SetRecord::volume).sum()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.sets.iter().map(|s| s.duration_secs).sum()
    }
}

/// Weight/reps fields the next logged set will use
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetInputs {
    pub weight: f64,
    pub reps: i32,
}

/// Transient edit fields for one set. Only ids are held; the set itself
/// stays in the routine.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub exercise_id: &'static str,
    pub set_id: u64,
    pub weight: f64,
    pub reps: i32,
}

/// Caller's answer to the "delete this set?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub exercise_id: &'static str,
    pub name: &'static str,
    pub sets: usize,
    pub volume: f64,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    /// Sum of weight x reps over strength exercises
    pub total_volume: f64,
    pub total_sets: usize,
    pub cardio_secs: u64,
    pub exercises: Vec<ExerciseSummary>,
    pub next_screen: Screen,
}

#[derive(Debug, Clone)]
pub struct Session {
    routine: Vec<ActiveExercise>,
    expanded: Option<&'static str>,
    inputs: SetInputs,
    timer: Timer,
    editing: Option<EditDraft>,
    next_set_id: u64,
}

/// Empty routine; set ids start at 1
impl Default for Session {
    fn default() -> Self {
        Self {
            routine: Vec::new(),
            expanded: None,
            inputs: SetInputs::default(),
            timer: Timer::default(),
            editing: None,
            next_set_id: 1,
        }
    }
}

impl Session {
    pub fn new(routine: Vec<ActiveExercise>) -> Self {
        Self {
            routine,
            ..Self::default()
        }
    }

    /// Session seeded with the recommended routine for a profile
    pub fn from_profile(profile: &Profile) -> Self {
        let session = Self::new(build_routine(profile));
        info!(
            exercises = session.routine.len(),
            goal = %profile.goal,
            "Session initialised"
        );
        session
    }

    pub fn routine(&self) -> &[ActiveExercise] {
        &self.routine
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<&ActiveExercise> {
        self.routine.iter().find(|ex| ex.id() == exercise_id)
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> Result<&mut ActiveExercise, SessionError> {
        self.routine
            .iter_mut()
            .find(|ex| ex.id() == exercise_id)
            .ok_or_else(|| SessionError::NotInRoutine(exercise_id.to_string()))
    }

    /// Logged sets for one exercise, in logging order
    pub fn history(&self, exercise_id: &str) -> Result<&[SetRecord], SessionError> {
        self.exercise(exercise_id)
            .map(|ex| ex.sets.as_slice())
            .ok_or_else(|| SessionError::NotInRoutine(exercise_id.to_string()))
    }

    /// Append a catalog exercise to the routine. Duplicates are rejected.
    pub fn add_exercise(&mut self, exercise_id: &str) -> Result<(), SessionError> {
        let definition = find_exercise(exercise_id)
            .ok_or_else(|| SessionError::UnknownExercise(exercise_id.to_string()))?;
        if self.exercise(exercise_id).is_some() {
            return Err(SessionError::AlreadyInRoutine(definition.name.to_string()));
        }
        self.routine.push(ActiveExercise::new(definition));
        debug!(exercise = definition.name, "Added to routine");
        Ok(())
    }

    pub fn expanded(&self) -> Option<&'static str> {
        self.expanded
    }

    /// Expand an exercise, or collapse it if it is already expanded.
    /// Expanding loads default inputs and resets the timer.
    pub fn toggle_expand(&mut self, exercise_id: &str) -> Result<(), SessionError> {
        if self.expanded == Some(exercise_id) {
            self.expanded = None;
            return Ok(());
        }
        let id = self
            .exercise(exercise_id)
            .map(ActiveExercise::id)
            .ok_or_else(|| SessionError::NotInRoutine(exercise_id.to_string()))?;
        self.expanded = Some(id);
        self.inputs = SetInputs {
            weight: DEFAULT_WEIGHT,
            reps: DEFAULT_REPS,
        };
        self.timer.reset();
        Ok(())
    }

    pub fn inputs(&self) -> SetInputs {
        self.inputs
    }

    pub fn set_inputs(&mut self, weight: f64, reps: i32) {
        self.inputs = SetInputs { weight, reps };
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn start_timer(&mut self, now: DateTime<Utc>) {
        self.timer.start(now);
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    pub fn toggle_timer(&mut self, now: DateTime<Utc>) {
        self.timer.toggle(now);
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        self.timer.tick(now)
    }

    /// Log a set from the current inputs and timer, then reset the timer.
    /// Strength sets take the input weight/reps, cardio sets log zeros.
    pub fn log_set(
        &mut self,
        exercise_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SetRecord, SessionError> {
        if self.exercise(exercise_id).is_none() {
            return Err(SessionError::NotInRoutine(exercise_id.to_string()));
        }
        let inputs = self.inputs;
        // Read the elapsed value before the reset below
        let duration_secs = self.timer.tick(now);
        let id = self.next_set_id;

        let exercise = self.exercise_mut(exercise_id)?;
        let (weight, reps) = match exercise.modality() {
            Modality::Strength => (inputs.weight, inputs.reps),
            Modality::Cardio => (0.0, 0),
        };
        let record = SetRecord {
            id,
            weight,
            reps,
            duration_secs,
            timestamp: now,
        };
        exercise.sets.push(record.clone());
        info!(
            exercise = exercise.definition.name,
            weight, reps, duration_secs, "Logged set"
        );

        self.next_set_id += 1;
        self.timer.reset();
        Ok(record)
    }

    fn find_set(&self, exercise_id: &str, set_id: u64) -> Result<&SetRecord, SessionError> {
        self.history(exercise_id)?
            .iter()
            .find(|s| s.id == set_id)
            .ok_or_else(|| SessionError::UnknownSet {
                exercise_id: exercise_id.to_string(),
                set_id,
            })
    }

    /// Overwrite weight/reps of one set. Id, duration and timestamp are kept.
    pub fn edit_set(
        &mut self,
        exercise_id: &str,
        set_id: u64,
        weight: f64,
        reps: i32,
    ) -> Result<(), SessionError> {
        let exercise = self.exercise_mut(exercise_id)?;
        let set = exercise
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or_else(|| SessionError::UnknownSet {
                exercise_id: exercise_id.to_string(),
                set_id,
            })?;
        set.weight = weight;
        set.reps = reps;
        debug!(exercise_id, set_id, weight, reps, "Edited set");
        Ok(())
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    /// Load a set's values into the edit draft
    pub fn begin_edit(&mut self, exercise_id: &str, set_id: u64) -> Result<(), SessionError> {
        let set = self.find_set(exercise_id, set_id)?;
        let (weight, reps) = (set.weight, set.reps);
        let exercise_id = self
            .exercise(exercise_id)
            .map(ActiveExercise::id)
            .ok_or_else(|| SessionError::NotInRoutine(exercise_id.to_string()))?;
        self.editing = Some(EditDraft {
            exercise_id,
            set_id,
            weight,
            reps,
        });
        Ok(())
    }

    pub fn update_edit(&mut self, weight: f64, reps: i32) -> Result<(), SessionError> {
        let draft = self.editing.as_mut().ok_or(SessionError::NotEditing)?;
        draft.weight = weight;
        draft.reps = reps;
        Ok(())
    }

    /// Write the draft back through the routine and close it
    pub fn save_edit(&mut self) -> Result<(), SessionError> {
        let draft = self.editing.clone().ok_or(SessionError::NotEditing)?;
        self.edit_set(draft.exercise_id, draft.set_id, draft.weight, draft.reps)?;
        self.editing = None;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Remove one set. Returns whether anything was removed; a declined
    /// confirmation leaves the routine untouched.
    pub fn delete_set(
        &mut self,
        exercise_id: &str,
        set_id: u64,
        confirmation: Confirmation,
    ) -> Result<bool, SessionError> {
        self.find_set(exercise_id, set_id)?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        let exercise = self.exercise_mut(exercise_id)?;
        exercise.sets.retain(|s| s.id != set_id);
        if self
            .editing
            .as_ref()
            .is_some_and(|d| d.exercise_id == exercise_id && d.set_id == set_id)
        {
            self.editing = None;
        }
        debug!(exercise_id, set_id, "Deleted set");
        Ok(true)
    }

    pub fn total_sets(&self) -> usize {
        self.routine.iter().map(|ex| ex.sets.len()).sum()
    }

    /// Sum of weight x reps over strength exercises only
    pub fn total_volume(&self) -> f64 {
        self.routine
            .iter()
            .filter(|ex| ex.modality() == Modality::Strength)
            .map(ActiveExercise::volume)
            .sum()
    }

    /// Complete the workout. Blocked only when nothing at all was logged,
    /// so cardio-only sessions with zero volume still complete.
    pub fn finish(&self) -> Result<WorkoutSummary, SessionError> {
        let total_sets = self.total_sets();
        if total_sets == 0 {
            return Err(SessionError::NothingLogged);
        }

        let exercises = self
            .routine
            .iter()
            .filter(|ex| !ex.sets.is_empty())
            .map(|ex| ExerciseSummary {
                exercise_id: ex.id(),
                name: ex.definition.name,
                sets: ex.sets.len(),
                volume: ex.volume(),
                duration_secs: ex.total_duration_secs(),
            })
            .collect();

        let cardio_secs = self
            .routine
            .iter()
            .filter(|ex| ex.modality() == Modality::Cardio)
            .map(ActiveExercise::total_duration_secs)
            .sum();

        let summary = WorkoutSummary {
            total_volume: self.total_volume(),
            total_sets,
            cardio_secs,
            exercises,
            next_screen: Screen::Analytics,
        };
        info!(
            total_volume = summary.total_volume,
            total_sets, "Workout complete"
        );
        Ok(summary)
    }
}
