/// Main entry point for the Rise habit engine CLI
///
/// This binary sets up logging, parses command line arguments, and drives the
/// engine against a local SQLite database. Results print as JSON on stdout;
/// logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use rise_habits::{
    CheckResetParams, CreateHabitParams, EngineError, HabitEngine, HabitId, ListParams,
    RestoreParams, StatusParams, UserId,
};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("rise_habits");
            p
        }),
        // 2. User's home directory
        dirs::home_dir().map(|mut p| {
            p.push(".rise_habits");
            p
        }),
        // 3. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".rise_habits");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let mut db_path = potential_path.clone();
            db_path.push("habits.db");
            return Ok(db_path);
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("rise_habits");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Rise habit engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's data directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed a user's points ledger
    InitUser {
        #[arg(long)]
        user: Uuid,
        /// Starting points balance
        #[arg(long, default_value_t = 0)]
        points: u32,
    },
    /// Create a habit or provisional task
    Add {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        title: String,
        /// daily, weekly or monthly
        #[arg(long)]
        frequency: String,
        /// good (do more) or bad (do less)
        #[arg(long, default_value = "good")]
        habit_type: String,
        /// Create as a provisional task that promotes after a success run
        #[arg(long)]
        task: bool,
    },
    /// List habits, rolling each into the current period first
    List {
        #[arg(long)]
        user: Uuid,
        /// Optional frequency filter: daily, weekly or monthly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Apply a status change: completed, skipped or active
    SetStatus {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        status: String,
    },
    /// Run the period rollover check on one habit
    CheckReset {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        title: String,
    },
    /// Spend points to repair a streak broken 2-3 periods ago
    Restore {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        title: String,
    },
    /// Delete a habit by id
    Remove {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

fn run(engine: &HabitEngine, command: Command) -> Result<serde_json::Value, EngineError> {
    match command {
        Command::InitUser { user, points } => {
            let user = engine.register_user(UserId(user), points)?;
            Ok(serde_json::json!({ "user": user }))
        }
        Command::Add {
            user,
            title,
            frequency,
            habit_type,
            task,
        } => {
            let habit = engine.create_habit(CreateHabitParams {
                user_id: UserId(user),
                title,
                frequency,
                habit_type,
                is_task: task,
            })?;
            Ok(serde_json::json!({ "habit": habit }))
        }
        Command::List { user, frequency } => {
            let frequency = frequency
                .map(|f| rise_habits::Frequency::parse(&f))
                .transpose()?;
            let habits = engine.reconcile_and_list(ListParams {
                user_id: UserId(user),
                frequency,
            })?;
            Ok(serde_json::json!({ "habits": habits }))
        }
        Command::SetStatus { user, title, status } => {
            let habit = engine.apply_status(StatusParams {
                user_id: UserId(user),
                title,
                status,
            })?;
            Ok(serde_json::json!({ "habit": habit }))
        }
        Command::CheckReset { user, title } => {
            let habit = engine.check_reset(CheckResetParams {
                user_id: UserId(user),
                title,
            })?;
            Ok(serde_json::json!({ "habit": habit }))
        }
        Command::Restore { user, title } => {
            let outcome = engine.restore_streak(RestoreParams {
                user_id: UserId(user),
                title,
            })?;
            Ok(serde_json::json!({
                "habit": outcome.habit,
                "cost": outcome.cost,
                "remainingPoints": outcome.remaining_points,
            }))
        }
        Command::Remove { user, id } => {
            engine.delete_habit(UserId(user), HabitId(id))?;
            Ok(serde_json::json!({ "deleted": id }))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("rise_habits={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let engine = HabitEngine::new(db_path)?;

    match run(&engine, args.command) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}
