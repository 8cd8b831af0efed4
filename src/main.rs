//! stitch - training tracker with an AI coach

use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stitch::config::{DEFAULT_DB_PATH, GatewayArgs};
use stitch::console::{self, write_exercise};
use stitch::db::{Database, KEY_GOAL};
use stitch::exercises::{Goal, search};
use stitch::profile::DEFAULT_LEVEL;
use stitch::session::recommend;
use stitch::{Coach, onboarding};

#[derive(Parser)]
#[command(name = "stitch")]
#[command(author, version, about = "Stitch - training tracker with an AI coach")]
struct Cli {
    /// Preference store path
    #[arg(long, env = "STITCH_DB", default_value = DEFAULT_DB_PATH, global = true)]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set goal and experience level, then generate a coach protocol
    Onboard {
        /// Strength, Hypertrophy, Endurance or "Fat Loss"
        #[arg(short, long)]
        goal: Goal,

        /// Experience level 0-100
        #[arg(short, long, default_value_t = DEFAULT_LEVEL,
              value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,

        #[command(flatten)]
        gateway: GatewayArgs,
    },

    /// Show the stored coach protocol
    Plan,

    /// List or search the exercise catalog
    Catalog {
        /// Case-insensitive name filter
        query: Option<String>,
    },

    /// Show the routine recommended for the stored profile
    Routine,

    /// Start an interactive workout session
    Track,

    /// Chat with the AI coach
    Coach {
        #[command(flatten)]
        gateway: GatewayArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;
    let mut out = std::io::stdout();

    match cli.command {
        Some(Commands::Onboard { goal, level, gateway }) => {
            let coach = Coach::from_config(&gateway.into_config()?)?;
            println!("Generating protocol for {goal} ({level}/100)...");
            let next = onboarding::initialize(&db, &coach, goal, level).await?;
            if let Some(plan) = db.load_plan()? {
                println!("\n{plan}\n");
            }
            println!("Saved. Next: {next}");
        }

        Some(Commands::Plan) => match db.load_plan()? {
            Some(plan) => println!("{plan}"),
            None => println!("No protocol yet. Run `stitch onboard`."),
        },

        Some(Commands::Catalog { query }) => {
            let found = search(query.as_deref().unwrap_or(""));
            if found.is_empty() {
                println!("No matches.");
            }
            for ex in found {
                write_exercise(&mut out, ex)?;
            }
        }

        Some(Commands::Routine) => {
            let profile = db.load_profile()?;
            println!(
                "Goal: {} | Level: {} ({})",
                profile.goal,
                profile.level,
                profile.tier().routine_label()
            );
            println!("{:-<60}", "");
            for ex in recommend(&profile) {
                write_exercise(&mut out, ex)?;
            }
        }

        Some(Commands::Track) => {
            console::run_tracker(&db).await?;
        }

        Some(Commands::Coach { gateway }) => {
            let coach = Coach::from_config(&gateway.into_config()?)?;
            console::run_coach(coach).await?;
        }

        None => {
            // Entry screen: route new users to onboarding, others to tracking
            if db.get(KEY_GOAL)?.is_none() {
                println!("Welcome to Stitch.");
                println!("Run `stitch onboard --goal <goal> --level <0-100>` to begin.");
            } else {
                let profile = db.load_profile()?;
                println!("Goal: {} | Level: {}", profile.goal, profile.level);
                println!("Run `stitch track` to start a workout or `stitch coach` to chat.");
            }
        }
    }

    out.flush()?;
    Ok(())
}
