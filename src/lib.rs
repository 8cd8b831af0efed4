//! stitch - training tracker core with an AI coach
//!
//! Goal-driven routine recommendation, set logging with a rest/work timer,
//! workout completion and a Gemini-backed coach chat.

pub mod coach;
pub mod config;
pub mod console;
pub mod db;
pub mod exercises;
pub mod onboarding;
pub mod profile;
pub mod screen;
pub mod session;

pub use coach::Coach;
pub use db::Database;
pub use profile::Profile;
pub use screen::Screen;
pub use session::Session;
