//! Campus Points CLI - reports from the points API.
//!
//! # Usage
//!
//! ```bash
//! # Print an organization's leaderboard
//! cpts leaderboard acm
//!
//! # Only the top ten
//! cpts leaderboard acm --limit 10
//!
//! # OAuth configuration across all organizations
//! cpts oauth-summary --details
//! ```
//!
//! # Environment Variables
//!
//! - `POINTS_API_URL` - Base URL of the points API
//! - `POINTS_API_TOKEN` - Admin bearer token

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use campus_points_core::OrgPrefix;

mod commands;

#[derive(Parser)]
#[command(name = "cpts")]
#[command(author, version, about = "Campus Points CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an organization's leaderboard
    Leaderboard {
        /// Organization prefix (e.g. `acm`)
        org: OrgPrefix,

        /// Print at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the OAuth configuration summary
    OauthSummary {
        /// Include callback URL and domains for each organization
        #[arg(short, long)]
        details: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_points_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let client = commands::client()?;
    let output = match cli.command {
        Commands::Leaderboard { org, limit } => {
            commands::leaderboard::run(&client, &org, limit).await?
        }
        Commands::OauthSummary { details } => {
            commands::oauth_summary::run(&client, details).await?
        }
    };
    print!("{output}");
    Ok(())
}
