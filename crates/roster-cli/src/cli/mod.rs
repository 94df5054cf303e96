//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use roster_core::config::{self, Config};
use roster_core::identity::RestIdentityGateway;
use roster_core::logging;
use roster_core::session::{Authenticator, SessionContext};
use roster_core::token_store::FileTokenStore;

mod commands;

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Employee directory client")]
#[command(
    long_about = "Employee directory client.\n\nRun without a subcommand to open the interactive directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password or a Google ID token
    Login(commands::auth::LoginArgs),

    /// Create an account, then sign in with it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ROSTER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and remove the stored session
    Logout,

    /// Show the start screen and the stored session
    Status,

    /// Fetch the directory and print one page
    List(commands::directory::ListArgs),

    /// Print the Google sign-in URL
    GoogleUrl,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    if let Err(err) = logging::init(&config.log, &config::paths::log_dir()) {
        eprintln!("Warning: file logging disabled: {err:#}");
    }

    let Some(command) = cli.command else {
        return commands::tui::run(&config, open_session(&config)?).await;
    };

    match command {
        Commands::Login(args) => {
            let mut session = open_session(&config)?;
            commands::auth::login(&config, &mut session, args).await
        }
        Commands::Register { email, password } => {
            let mut session = open_session(&config)?;
            commands::auth::register(&mut session, &email, &password).await
        }
        Commands::Logout => {
            let mut session = open_session(&config)?;
            commands::auth::logout(&mut session).await
        }
        Commands::Status => commands::auth::status(&open_session(&config)?),
        Commands::List(args) => {
            let session = open_session(&config)?;
            commands::directory::list(&config, &session, args).await
        }
        Commands::GoogleUrl => commands::auth::google_url(&config),

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

/// Session backed by the identity service and the on-disk token file.
fn open_session(config: &Config) -> Result<SessionContext> {
    let gateway = Arc::new(RestIdentityGateway::from_config(&config.identity));
    let store = Arc::new(FileTokenStore::default_location());
    let auth = Authenticator::new(gateway, store);
    SessionContext::open(auth).context("read stored session")
}
