pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod sync;

use crate::core::config::AppConfig;
use crate::core::{Notifier, QuoteStore};
use crate::providers::HttpQuoteSource;
use crate::store::Storages;
use crate::sync::SyncAgent;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Show {
        category: Option<String>,
    },
    Add {
        text: String,
        category: String,
    },
    List {
        category: Option<String>,
    },
    Categories,
    Filter {
        category: String,
    },
    Import {
        path: PathBuf,
    },
    Export {
        output: PathBuf,
    },
    Sync,
    Watch,
}

/// Everything a command needs: the loaded store and the agent syncing it.
pub struct App {
    pub config: AppConfig,
    pub store: Arc<Mutex<QuoteStore>>,
    pub agent: Arc<SyncAgent>,
    pub notifier: Arc<dyn Notifier>,
}

impl App {
    pub async fn open(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storages = Storages::open(&config)?;
        let mut store = QuoteStore::new(storages.durable, storages.session);
        store.load().await;
        debug!("Quote store ready with {} quotes", store.len());

        let store = Arc::new(Mutex::new(store));
        let remote = Arc::new(HttpQuoteSource::from_config(&config.remote)?);
        let agent = Arc::new(SyncAgent::new(
            Arc::clone(&store),
            remote,
            Arc::clone(&notifier),
        ));

        Ok(Self {
            config,
            store,
            agent,
            notifier,
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("quotefeed starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::open(config, Arc::new(cli::ui::ConsoleNotifier)).await?;

    match command {
        AppCommand::Show { category } => {
            cli::quotes::show(&app, category.as_deref(), false).await
        }
        AppCommand::Add { text, category } => cli::quotes::add(&app, &text, &category).await,
        AppCommand::List { category } => cli::quotes::list(&app, category.as_deref()).await,
        AppCommand::Categories => cli::quotes::categories(&app).await,
        AppCommand::Filter { category } => cli::quotes::filter(&app, &category).await,
        AppCommand::Import { path } => cli::transfer::import(&app, &path).await,
        AppCommand::Export { output } => cli::transfer::export(&app, &output).await,
        AppCommand::Sync => cli::sync::sync(&app).await,
        AppCommand::Watch => cli::watch::watch(&app).await,
    }
}
