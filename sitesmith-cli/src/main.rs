//! sitesmith CLI tool

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitesmith_cli_lib::commands::{
    AuthCommand, ExportCommand, FetchCommand, FormCommand, PublishCommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitesmith")]
#[command(version)]
#[command(about = "Turn a GitHub template repository into a personalized website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a template and show its form summary
    Fetch {
        /// GitHub repository URL of the template
        repo_url: String,
        /// Branch to fetch (defaults to the configured branch)
        #[arg(long)]
        branch: Option<String>,
        /// Subfolder of the repository holding the template
        #[arg(long)]
        folder: Option<String>,
    },
    /// Fill in the template's form interactively with a live preview
    Form {
        /// GitHub repository URL of the template
        repo_url: String,
        /// Branch to fetch (defaults to the configured branch)
        #[arg(long)]
        branch: Option<String>,
        /// Subfolder of the repository holding the template
        #[arg(long)]
        folder: Option<String>,
        /// Directory the live preview renders into
        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },
    /// Render the template with the saved answers and write a zip
    Export {
        /// GitHub repository URL of the template
        repo_url: String,
        /// Branch to fetch (defaults to the configured branch)
        #[arg(long)]
        branch: Option<String>,
        /// Subfolder of the repository holding the template
        #[arg(long)]
        folder: Option<String>,
        /// Output path (defaults to a name derived from the form)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the template and push it to a GitHub repository
    Publish {
        /// GitHub repository URL of the template
        repo_url: String,
        /// Name of the repository to publish into
        #[arg(long)]
        repo: String,
        /// Branch to fetch (defaults to the configured branch)
        #[arg(long)]
        branch: Option<String>,
        /// Subfolder of the repository holding the template
        #[arg(long)]
        folder: Option<String>,
        /// Owner of the existing repository to push to
        #[arg(long)]
        owner: Option<String>,
        /// Push to an existing repository instead of creating one
        #[arg(long)]
        existing: bool,
        /// Description for a newly created repository
        #[arg(long)]
        description: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage the stored GitHub token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
        /// Base URL of the token broker
        #[arg(long)]
        broker: Option<String>,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Print the browser authorization URL
    Url,
    /// Exchange an OAuth code for a token and store it
    Exchange {
        /// Authorization code from the OAuth callback
        code: String,
    },
    /// Store a token obtained elsewhere
    Token {
        /// The token to store
        token: String,
    },
    /// Forget the stored token
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    sitesmith::observability::init()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            repo_url,
            branch,
            folder,
        } => {
            FetchCommand::new(repo_url, branch, folder).execute().await?;
        }
        Commands::Form {
            repo_url,
            branch,
            folder,
            preview_dir,
        } => {
            FormCommand::new(repo_url, branch, folder, preview_dir)
                .execute()
                .await?;
        }
        Commands::Export {
            repo_url,
            branch,
            folder,
            output,
        } => {
            ExportCommand::new(repo_url, branch, folder, output)
                .execute()
                .await?;
        }
        Commands::Publish {
            repo_url,
            repo,
            branch,
            folder,
            owner,
            existing,
            description,
            yes,
        } => {
            PublishCommand::new(
                repo_url,
                branch,
                folder,
                repo,
                owner,
                existing,
                description,
                yes,
            )
            .execute()
            .await?;
        }
        Commands::Auth { command, broker } => {
            let auth = match command {
                AuthCommands::Url => AuthCommand::Url,
                AuthCommands::Exchange { code } => AuthCommand::Exchange { code },
                AuthCommands::Token { token } => AuthCommand::Token { token },
                AuthCommands::Clear => AuthCommand::Clear,
            };
            auth.execute(broker).await?;
        }
    }

    Ok(())
}
