//! Set timer shared by whichever exercise is expanded

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// How often a running timer recomputes its elapsed value
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Elapsed time is derived from the wall clock, never accumulated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timer {
    started_at: Option<DateTime<Utc>>,
    elapsed_secs: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Last computed elapsed value in whole seconds
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.elapsed_secs = 0;
    }

    /// Stop counting; the last elapsed value stays visible until reset
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.elapsed_secs = 0;
    }

    /// Recompute elapsed from `now`. No-op when stopped.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        if let Some(start) = self.started_at {
            self.elapsed_secs = (now - start).num_seconds().max(0) as u64;
        }
        self.elapsed_secs
    }
}

/// Format seconds as mm:ss
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Periodic tick source that only exists while a timer runs.
/// Disarming drops the interval, so no callback outlives the timer.
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    pub fn arm(&mut self) {
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    /// Match the ticker to the timer's running state
    pub fn sync(&mut self, timer: &Timer) {
        match (timer.is_running(), self.is_armed()) {
            (true, false) => self.arm(),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    /// Resolve on the next tick. Pends forever while disarmed,
    /// which makes it safe to use as a `select!` branch.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_new_timer_is_stopped() {
        let timer = Timer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn test_tick_derives_from_wall_clock() {
        let mut timer = Timer::new();
        timer.start(t0());
        assert_eq!(timer.tick(t0() + ChronoDuration::milliseconds(2900)), 2);
        assert_eq!(timer.tick(t0() + ChronoDuration::seconds(61)), 61);
    }

    #[test]
    fn test_stop_keeps_elapsed() {
        let mut timer = Timer::new();
        timer.start(t0());
        timer.tick(t0() + ChronoDuration::seconds(42));
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.tick(t0() + ChronoDuration::seconds(100)), 42);
    }

    #[test]
    fn test_start_resets_elapsed() {
        let mut timer = Timer::new();
        timer.start(t0());
        timer.tick(t0() + ChronoDuration::seconds(30));
        timer.stop();
        timer.start(t0() + ChronoDuration::seconds(40));
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn test_toggle() {
        let mut timer = Timer::new();
        timer.toggle(t0());
        assert!(timer.is_running());
        timer.toggle(t0());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_clock_going_backwards_clamps_to_zero() {
        let mut timer = Timer::new();
        timer.start(t0());
        assert_eq!(timer.tick(t0() - ChronoDuration::seconds(5)), 0);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_fires_once_per_period() {
        let mut ticker = Ticker::new();
        ticker.arm();
        let before = Instant::now();
        ticker.tick().await;
        assert!(Instant::now() - before >= TICK_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_ticker_never_fires() {
        let mut ticker = Ticker::new();
        let fired = tokio::time::timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn test_sync_follows_timer() {
        let mut timer = Timer::new();
        let mut ticker = Ticker::new();

        timer.start(t0());
        ticker.sync(&timer);
        assert!(ticker.is_armed());

        timer.stop();
        ticker.sync(&timer);
        assert!(!ticker.is_armed());
    }
}
