//! ProjectPulse session harness - drives the session controller against an
//! in-memory identity backend.

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pulse_config_and_utils::{init_logging_for_service, Config, Paths};

/// ProjectPulse session command-line interface.
#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Exercise the ProjectPulse sign-in flows from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the config value
    #[arg(short, long, global = true, env = "PULSE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Base directory for config and logs. Defaults to ~/.projectpulse
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// JSON file with accounts to seed the backend with
    #[arg(long, global = true)]
    accounts: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account and sign into it
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Role label, e.g. "Project Manager" or "Team Member"
        #[arg(long, default_value = "Team Member")]
        role: String,
    },
    /// Request a password-reset message
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// End the current session
    SignOut,
    /// List selectable role labels and where each lands
    Roles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging_for_service("pulse", level, Some(&paths));

    let accounts = match cli.accounts {
        Some(path) => app::load_accounts(&path)?,
        None => Vec::new(),
    };

    let mut stdout = std::io::stdout().lock();
    app::run(cli.command, &config, accounts, &mut stdout).await?;

    Ok(())
}
