//! Workout tracker console
//!
//! Line-based commands drive a [`Session`]. The timer ticker only exists
//! while the timer runs and is dropped when the loop ends.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::write_exercise;
use crate::db::Database;
use crate::exercises::{Modality, search};
use crate::profile::Profile;
use crate::session::{Confirmation, Session, Ticker, format_elapsed};

const HELP: &str = "Commands:
  list                      show the routine
  open <id>                 expand/collapse an exercise
  weight <kg> | reps <n>    set inputs for the next set
  timer                     start/stop the set timer
  log                       log a set for the expanded exercise
  history <id>              show logged sets
  edit <id> <set>           edit a set, then: save <kg> <reps> | cancel
  delete <id> <set>         delete a set (asks for confirmation)
  search <text>             search the catalog
  add <id>                  add a catalog exercise to the routine
  finish                    complete the workout
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum TrackCommand {
    List,
    Open(String),
    Weight(f64),
    Reps(i32),
    Timer,
    Log,
    History(String),
    Edit { exercise_id: String, set_id: u64 },
    Save { weight: f64, reps: i32 },
    Cancel,
    Delete { exercise_id: String, set_id: u64 },
    Search(String),
    Add(String),
    Finish,
    Help,
    Quit,
}

impl TrackCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            bail!("Empty command");
        };
        let mut arg = |name: &str| {
            words
                .next()
                .map(str::to_string)
                .with_context(|| format!("Missing <{name}>"))
        };

        let command = match cmd.to_lowercase().as_str() {
            "list" | "ls" => TrackCommand::List,
            "open" => TrackCommand::Open(arg("id")?),
            "weight" => {
                let kg = arg("kg")?.parse().context("Weight must be a number")?;
                TrackCommand::Weight(kg)
            }
            "reps" => {
                let n = arg("n")?.parse().context("Reps must be a whole number")?;
                TrackCommand::Reps(n)
            }
            "timer" => TrackCommand::Timer,
            "log" => TrackCommand::Log,
            "history" => TrackCommand::History(arg("id")?),
            "edit" => TrackCommand::Edit {
                exercise_id: arg("id")?,
                set_id: arg("set")?.parse().context("Set id must be a number")?,
            },
            "save" => TrackCommand::Save {
                weight: arg("kg")?.parse().context("Weight must be a number")?,
                reps: arg("reps")?.parse().context("Reps must be a whole number")?,
            },
            "cancel" => TrackCommand::Cancel,
            "delete" | "rm" => TrackCommand::Delete {
                exercise_id: arg("id")?,
                set_id: arg("set")?.parse().context("Set id must be a number")?,
            },
            "search" => {
                let rest = line.trim_start()[cmd.len()..].trim();
                TrackCommand::Search(rest.to_string())
            }
            "add" => TrackCommand::Add(arg("id")?),
            "finish" => TrackCommand::Finish,
            "help" | "?" => TrackCommand::Help,
            "quit" | "exit" => TrackCommand::Quit,
            other => bail!("Unknown command '{other}'. Type 'help'."),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

/// Pending yes/no question
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Command,
    ConfirmDelete { exercise_id: String, set_id: u64 },
}

#[derive(Debug)]
pub struct Tracker {
    session: Session,
    mode: Mode,
}

impl Tracker {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            mode: Mode::Command,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Handle one input line. User mistakes are reported to `out`; only
    /// write failures propagate.
    pub fn handle_line(
        &mut self,
        line: &str,
        now: DateTime<Utc>,
        out: &mut impl Write,
    ) -> Result<Step> {
        let pending = std::mem::replace(&mut self.mode, Mode::Command);
        if let Mode::ConfirmDelete { exercise_id, set_id } = pending {
            let answer = line.trim().to_lowercase();
            let confirmation = match answer.as_str() {
                "y" | "yes" => Confirmation::Confirmed,
                _ => Confirmation::Declined,
            };
            match self.session.delete_set(&exercise_id, set_id, confirmation) {
                Ok(true) => writeln!(out, "Set {set_id} deleted.")?,
                Ok(false) => writeln!(out, "Kept set {set_id}.")?,
                Err(e) => writeln!(out, "{e}")?,
            }
            // Anything other than an answer is also a command
            if matches!(answer.as_str(), "" | "y" | "yes" | "n" | "no") {
                return Ok(Step::Continue);
            }
        }

        if line.trim().is_empty() {
            return Ok(Step::Continue);
        }
        let command = match TrackCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e:#}")?;
                return Ok(Step::Continue);
            }
        };
        debug!(?command, "Tracker command");
        self.apply(command, now, out)
    }

    fn apply(
        &mut self,
        command: TrackCommand,
        now: DateTime<Utc>,
        out: &mut impl Write,
    ) -> Result<Step> {
        match command {
            TrackCommand::List => self.write_routine(out)?,
            TrackCommand::Open(id) => match self.session.toggle_expand(&id) {
                Ok(()) => match self.session.expanded() {
                    Some(id) => {
                        let inputs = self.session.inputs();
                        let (weight, reps) = (inputs.weight, inputs.reps);
                        writeln!(out, "{id} open. Inputs: {weight} kg x {reps}")?;
                    }
                    None => writeln!(out, "Collapsed.")?,
                },
                Err(e) => writeln!(out, "{e}")?,
            },
            TrackCommand::Weight(weight) => {
                let reps = self.session.inputs().reps;
                self.session.set_inputs(weight, reps);
            }
            TrackCommand::Reps(reps) => {
                let weight = self.session.inputs().weight;
                self.session.set_inputs(weight, reps);
            }
            TrackCommand::Timer => {
                self.session.toggle_timer(now);
                let timer = self.session.timer();
                let state = if timer.is_running() { "running" } else { "stopped" };
                writeln!(out, "Timer {state} at {}", format_elapsed(timer.elapsed_secs()))?;
            }
            TrackCommand::Log => match self.session.expanded() {
                Some(id) => match self.session.log_set(id, now) {
                    Ok(set) => writeln!(
                        out,
                        "Logged set {}: {} kg x {} in {}",
                        set.id,
                        set.weight,
                        set.reps,
                        format_elapsed(set.duration_secs)
                    )?,
                    Err(e) => writeln!(out, "{e}")?,
                },
                None => writeln!(out, "Open an exercise first.")?,
            },
            TrackCommand::History(id) => match self.session.history(&id) {
                Ok([]) => writeln!(out, "No sets logged for {id}.")?,
                Ok(sets) => {
                    for set in sets {
                        writeln!(
                            out,
                            "  #{:<3} {:>6} kg x {:<3} {}  {}",
                            set.id,
                            set.weight,
                            set.reps,
                            format_elapsed(set.duration_secs),
                            set.timestamp.format("%H:%M:%S")
                        )?;
                    }
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            TrackCommand::Edit { exercise_id, set_id } => {
                match self.session.begin_edit(&exercise_id, set_id) {
                    Ok(()) => {
                        if let Some(draft) = self.session.editing() {
                            writeln!(
                                out,
                                "Editing set {}: {} kg x {}. 'save <kg> <reps>' or 'cancel'.",
                                draft.set_id, draft.weight, draft.reps
                            )?;
                        }
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            TrackCommand::Save { weight, reps } => {
                let saved = self
                    .session
                    .update_edit(weight, reps)
                    .and_then(|()| self.session.save_edit());
                match saved {
                    Ok(()) => writeln!(out, "Saved.")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            TrackCommand::Cancel => {
                self.session.cancel_edit();
                writeln!(out, "Edit cancelled.")?;
            }
            TrackCommand::Delete { exercise_id, set_id } => {
                match self.session.history(&exercise_id) {
                    Ok(sets) if sets.iter().any(|s| s.id == set_id) => {
                        writeln!(out, "Delete set {set_id}? [y/N]")?;
                        self.mode = Mode::ConfirmDelete { exercise_id, set_id };
                    }
                    Ok(_) => writeln!(out, "No set {set_id} for {exercise_id}")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            TrackCommand::Search(query) => {
                let found = search(&query);
                if found.is_empty() {
                    writeln!(out, "No matches.")?;
                }
                for ex in found {
                    write_exercise(out, ex)?;
                }
            }
            TrackCommand::Add(id) => match self.session.add_exercise(&id) {
                Ok(()) => writeln!(out, "Added {id}.")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            TrackCommand::Finish => match self.session.finish() {
                Ok(summary) => {
                    writeln!(out, "Workout complete.")?;
                    for ex in &summary.exercises {
                        writeln!(
                            out,
                            "  {:22} {} sets  {:.0} kg  {}",
                            ex.name,
                            ex.sets,
                            ex.volume,
                            format_elapsed(ex.duration_secs)
                        )?;
                    }
                    writeln!(
                        out,
                        "Total: {} sets, {:.0} kg volume, {} cardio",
                        summary.total_sets,
                        summary.total_volume,
                        format_elapsed(summary.cardio_secs)
                    )?;
                    writeln!(out, "Next: {}", summary.next_screen)?;
                    return Ok(Step::Done);
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            TrackCommand::Help => writeln!(out, "{HELP}")?,
            TrackCommand::Quit => return Ok(Step::Done),
        }
        Ok(Step::Continue)
    }

    pub fn write_routine(&self, out: &mut impl Write) -> Result<()> {
        if self.session.routine().is_empty() {
            writeln!(out, "Routine is empty. Use 'search' and 'add'.")?;
        }
        for ex in self.session.routine() {
            let marker = if self.session.expanded() == Some(ex.id()) { ">" } else { " " };
            let detail = match ex.modality() {
                Modality::Strength => format!("{:.0} kg", ex.volume()),
                Modality::Cardio => format_elapsed(ex.total_duration_secs()),
            };
            writeln!(
                out,
                "{marker} {:10} {:22} {} sets  {detail}",
                ex.id(),
                ex.definition.name,
                ex.sets.len()
            )?;
        }
        Ok(())
    }
}

/// Profile line followed by the stored coach protocol, if any
pub fn write_header(out: &mut impl Write, profile: &Profile, plan: Option<&str>) -> Result<()> {
    writeln!(
        out,
        "Goal: {} | Tier: {}",
        profile.goal,
        profile.tier().routine_label()
    )?;
    if let Some(plan) = plan.map(str::trim).filter(|p| !p.is_empty()) {
        writeln!(out, "Protocol: {plan}")?;
    }
    Ok(())
}

/// Run the tracker against stdin/stdout until finish, quit, EOF or Ctrl-C
pub async fn run_tracker(db: &Database) -> Result<()> {
    let profile = db.load_profile()?;
    let plan = db.load_plan()?;
    info!(goal = %profile.goal, level = profile.level, "Starting tracker");

    let mut tracker = Tracker::new(Session::from_profile(&profile));
    let mut ticker = Ticker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    write_header(&mut out, &profile, plan.as_deref())?;
    tracker.write_routine(&mut out)?;
    writeln!(out, "Type 'help' for commands.")?;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let secs = tracker.session_mut().tick(Utc::now());
                write!(out, "\r[{}] ", format_elapsed(secs))?;
                out.flush()?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let step = tracker.handle_line(&line, Utc::now(), &mut out)?;
                ticker.sync(tracker.session().timer());
                if step == Step::Done {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                writeln!(out)?;
                break;
            }
        }
    }

    ticker.disarm();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::exercises::Goal;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn tracker() -> Tracker {
        Tracker::new(Session::from_profile(&Profile::new(Goal::Hypertrophy, 50)))
    }

    fn run(tracker: &mut Tracker, line: &str, now: DateTime<Utc>) -> (Step, String) {
        let mut out = Vec::new();
        let step = tracker.handle_line(line, now, &mut out).unwrap();
        (step, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(TrackCommand::parse("open sq").unwrap(), TrackCommand::Open("sq".into()));
        assert_eq!(TrackCommand::parse("weight 62.5").unwrap(), TrackCommand::Weight(62.5));
        assert_eq!(
            TrackCommand::parse("edit bp 3").unwrap(),
            TrackCommand::Edit { exercise_id: "bp".into(), set_id: 3 }
        );
        assert_eq!(
            TrackCommand::parse("search  bench press ").unwrap(),
            TrackCommand::Search("bench press".into())
        );
        assert_eq!(TrackCommand::parse("search").unwrap(), TrackCommand::Search(String::new()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(TrackCommand::parse("open").is_err());
        assert!(TrackCommand::parse("reps ten").is_err());
        assert!(TrackCommand::parse("jump").is_err());
    }

    #[test]
    fn test_log_with_timer() {
        let mut t = tracker();
        run(&mut t, "open sq", t0());
        run(&mut t, "weight 100", t0());
        run(&mut t, "reps 5", t0());
        run(&mut t, "timer", t0());
        let (_, output) = run(&mut t, "log", t0() + Duration::seconds(42));

        assert!(output.contains("100 kg x 5 in 00:42"), "{output}");
        let sets = t.session().history("sq").unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].duration_secs, 42);
        assert!(!t.session().timer().is_running());
    }

    #[test]
    fn test_log_requires_open_exercise() {
        let mut t = tracker();
        let (_, output) = run(&mut t, "log", t0());
        assert!(output.contains("Open an exercise first"));
        assert_eq!(t.session().total_sets(), 0);
    }

    #[test]
    fn test_delete_asks_first() {
        let mut t = tracker();
        run(&mut t, "open bp", t0());
        run(&mut t, "log", t0());

        let (_, output) = run(&mut t, "delete bp 1", t0());
        assert!(output.contains("[y/N]"));
        run(&mut t, "n", t0());
        assert_eq!(t.session().history("bp").unwrap().len(), 1);

        run(&mut t, "delete bp 1", t0());
        let (_, output) = run(&mut t, "y", t0());
        assert!(output.contains("deleted"));
        assert!(t.session().history("bp").unwrap().is_empty());
    }

    #[test]
    fn test_delete_prompt_passes_commands_through() {
        let mut t = tracker();
        run(&mut t, "open bp", t0());
        run(&mut t, "log", t0());

        run(&mut t, "delete bp 1", t0());
        let (step, output) = run(&mut t, "list", t0());
        assert_eq!(step, Step::Continue);
        assert!(output.contains("Kept set 1."), "{output}");
        assert!(output.contains("Bench Press"), "{output}");
        assert_eq!(t.session().history("bp").unwrap().len(), 1);

        // An empty answer declines without running anything
        run(&mut t, "delete bp 1", t0());
        let (_, output) = run(&mut t, "", t0());
        assert_eq!(output, "Kept set 1.\n");
        let (_, output) = run(&mut t, "y", t0());
        assert!(output.contains("Unknown command"), "{output}");
        assert_eq!(t.session().history("bp").unwrap().len(), 1);
    }

    #[test]
    fn test_header_shows_stored_protocol() {
        let profile = Profile::new(Goal::Strength, 90);
        let mut out = Vec::new();
        write_header(&mut out, &profile, Some("Heavy triples, long rests.\n")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Goal: Strength | Tier: Advanced\nProtocol: Heavy triples, long rests.\n"
        );

        let mut out = Vec::new();
        write_header(&mut out, &profile, None).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Protocol"));
    }

    #[test]
    fn test_edit_flow() {
        let mut t = tracker();
        run(&mut t, "open bp", t0());
        run(&mut t, "log", t0());
        run(&mut t, "edit bp 1", t0());
        assert!(t.session().editing().is_some());

        run(&mut t, "save 80 8", t0());
        let set = &t.session().history("bp").unwrap()[0];
        assert_eq!((set.weight, set.reps), (80.0, 8));
        assert!(t.session().editing().is_none());
    }

    #[test]
    fn test_add_duplicate_reported() {
        let mut t = tracker();
        let (_, output) = run(&mut t, "add sq", t0());
        assert!(output.contains("already in the routine"));
        run(&mut t, "add run", t0());
        assert!(t.session().exercise("run").is_some());
    }

    #[test]
    fn test_finish_blocked_then_done() {
        let mut t = tracker();
        let (step, output) = run(&mut t, "finish", t0());
        assert_eq!(step, Step::Continue);
        assert!(output.contains("Log some sets first"));

        run(&mut t, "open sq", t0());
        run(&mut t, "log", t0());
        let (step, output) = run(&mut t, "finish", t0());
        assert_eq!(step, Step::Done);
        assert!(output.contains("Total: 1 sets, 500 kg volume"), "{output}");
        assert!(output.contains("Next: /analytics"));
    }

    #[test]
    fn test_unknown_command_keeps_going() {
        let mut t = tracker();
        let (step, output) = run(&mut t, "fly", t0());
        assert_eq!(step, Step::Continue);
        assert!(output.contains("Unknown command"));
    }
}
