//! Prompt text and fixed fallback replies

use crate::exercises::Goal;
use crate::profile::ExperienceTier;

pub const PERSONA_INSTRUCTION: &str = "You are Stitch AI, an elite high-performance athletic coach.
Your tone is technical, motivating, and concise.
You are an expert in biomechanics, nutrition, and exercise physiology.
If the user uploads an image of equipment, explain how to use it safely.
If the user uploads a video of a workout, critique their form with precision.
If the user uploads food, estimate macros and suitability for hypertrophy.";

/// First message of every chat transcript
pub const GREETING: &str = "Systems online. I am Stitch AI. Ready to analyze your performance.";

pub const PLAN_EMPTY_FALLBACK: &str =
    "Protocol generation failed. Proceed with standard operating procedure.";
pub const PLAN_ERROR_FALLBACK: &str = "Offline Mode. Standard hypertrophy protocols apply.";
pub const CHAT_EMPTY_FALLBACK: &str = "I couldn't generate a response. Please try again.";
pub const CHAT_ERROR_FALLBACK: &str =
    "Connection to Stitch Neural Net failed. Please check your API key and connection.";

/// Prompt text used when a message carries only attachments
pub const ANALYZE_VIDEO: &str = "Analyze this video";
pub const ANALYZE_IMAGE: &str = "Analyze this image";

pub fn workout_plan_prompt(goal: Goal, level: u8) -> String {
    let label = ExperienceTier::from_level(level).protocol_label();
    format!(
        "User Profile:
- Goal: {goal}
- Experience Level: {label} ({level}/100)

Generate a brief, high-intensity \"Coach's Protocol\" for this user.
Format:
1. A one-sentence motivating directive (e.g., \"Focus on eccentric control.\").
2. Specific Warm-up Protocol: List 3 dynamic movements to prime the nervous system.
3. Main Directive: Three bullet points of specific technical advice for their goal.
4. Cool-down Protocol: List 2 static stretches or recovery techniques.

Keep it short, cyberpunk style, and actionable."
    )
}
