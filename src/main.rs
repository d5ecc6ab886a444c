use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use quotefeed::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for quotefeed::AppCommand {
    fn from(cmd: Commands) -> quotefeed::AppCommand {
        match cmd {
            Commands::Show { category } => quotefeed::AppCommand::Show { category },
            Commands::Add { text, category } => quotefeed::AppCommand::Add { text, category },
            Commands::List { category } => quotefeed::AppCommand::List { category },
            Commands::Categories => quotefeed::AppCommand::Categories,
            Commands::Filter { category } => quotefeed::AppCommand::Filter { category },
            Commands::Import { path } => quotefeed::AppCommand::Import { path },
            Commands::Export { output } => quotefeed::AppCommand::Export { output },
            Commands::Sync => quotefeed::AppCommand::Sync,
            Commands::Watch => quotefeed::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show a random quote from the selected category
    Show {
        /// Category to pick from, persisted as the new filter
        #[arg(short = 'g', long)]
        category: Option<String>,
    },
    /// Add a quote and sync with the server
    Add { text: String, category: String },
    /// List quotes in the selected category
    List {
        #[arg(short = 'g', long)]
        category: Option<String>,
    },
    /// List known categories
    Categories,
    /// Select the category filter
    Filter { category: String },
    /// Merge quotes from a JSON file
    Import { path: PathBuf },
    /// Write all quotes as JSON, `-` for stdout
    Export {
        #[arg(short, long, default_value = "quotes.json")]
        output: PathBuf,
    },
    /// Pull new quotes from the server once
    Sync,
    /// Keep syncing in the background and read commands from stdin
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => quotefeed::cli::setup::setup(),
        Some(cmd) => quotefeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
