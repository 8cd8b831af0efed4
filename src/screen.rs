//! Screens the app can be on. Core operations report where to go next.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Entry,
    Onboarding,
    Tracker,
    Analytics,
    Leaderboard,
    Community,
}

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Entry => "/",
            Screen::Onboarding => "/onboarding",
            Screen::Tracker => "/tracker",
            Screen::Analytics => "/analytics",
            Screen::Leaderboard => "/leaderboard",
            Screen::Community => "/community",
        }
    }

    /// Entry and onboarding hide the bottom navigation
    pub fn shows_navigation(&self) -> bool {
        !matches!(self, Screen::Entry | Screen::Onboarding)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
