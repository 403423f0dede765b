use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use eurofx::core::log::init_logging;

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

impl From<Commands> for eurofx::AppCommand {
    fn from(cmd: Commands) -> eurofx::AppCommand {
        match cmd {
            Commands::Ingest { event } => eurofx::AppCommand::Ingest { event },
            Commands::Report { json } => eurofx::AppCommand::Report { json },
            Commands::Show { date } => eurofx::AppCommand::Show { date },
            Commands::History => eurofx::AppCommand::History,
            Commands::Serve => eurofx::AppCommand::Serve,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch today's reference rates and store them
    Ingest {
        /// Trigger event as JSON, logged with the outcome
        #[arg(long)]
        event: Option<String>,
    },
    /// Compare today's rates against yesterday's
    Report {
        /// Print the response body as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display the stored snapshot for a date (YYYY-MM-DD)
    Show { date: String },
    /// List stored snapshot dates
    History,
    /// Serve the comparison over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => eurofx::cli::setup::setup(),
        Some(cmd) => eurofx::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
