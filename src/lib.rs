pub mod cli;
pub mod compare;
pub mod core;
pub mod ingest;
pub mod providers;
pub mod report;
pub mod server;
pub mod store;

pub use crate::core::config;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Ingest { event: Option<String> },
    Report { json: bool },
    Show { date: String },
    History,
    Serve,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::shared_store(&config).await?;

    match command {
        AppCommand::Ingest { event } => {
            let feed = providers::EcbFeedClient::new(&config.feed.url);
            cli::ingest::run(&feed, store.as_ref(), &config.feed.namespace, event.as_deref()).await
        }
        AppCommand::Report { json } => cli::report::run(store.as_ref(), json).await,
        AppCommand::Show { date } => cli::history::show(store.as_ref(), &date).await,
        AppCommand::History => cli::history::history(store.as_ref()).await,
        AppCommand::Serve => {
            let addr = config.listen_addr()?;
            info!("Serving exchange rate comparison");
            let reporter = Arc::new(report::Reporter::new(store));
            server::run(addr, reporter).await
        }
    }
}
