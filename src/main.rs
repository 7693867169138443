use chrono::Utc;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use whos_up_there::config::Config;
use whos_up_there::feed::HttpFeed;
use whos_up_there::ingest::Ingestor;
use whos_up_there::observation::{JsonlStore, MemoryStore, ObservationStore};
use whos_up_there::web::{run_server, AppState};

#[derive(Parser)]
#[command(name = "whos-up-there")]
#[command(about = "Track aircraft passing over a fixed observer")]
struct Cli {
    /// YAML config file; environment variables override it
    #[arg(short, long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and serve the status pages
    Serve {
        /// Serve only, without polling the feed
        #[arg(long)]
        no_ingest: bool,
        /// Keep observations in memory instead of on disk
        #[arg(long)]
        memory: bool,
    },
    /// Poll the feed until interrupted
    Ingest,
    /// Print the current flight statuses once
    Status,
    /// Check the configuration
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve { no_ingest, memory } => serve(config, !no_ingest, memory).await,
        Commands::Ingest => ingest(config).await,
        Commands::Status => status(config),
        Commands::Validate => validate(&config),
    }
}

fn open_store(config: &Config, memory: bool) -> Option<Arc<dyn ObservationStore>> {
    if memory {
        return Some(Arc::new(MemoryStore::new()));
    }
    match JsonlStore::open(config.storage.base_folder.clone()) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            eprintln!(
                "Unable to open store at {}: {}",
                config.storage.base_folder.display(),
                e
            );
            None
        }
    }
}

fn build_ingestor(config: &Config, store: Arc<dyn ObservationStore>) -> Option<Ingestor> {
    let (url, observer) = match (config.feed_url(), config.observer_point()) {
        (Ok(url), Ok(observer)) => (url, observer),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Config error: {}", e);
            return None;
        }
    };
    let feed = HttpFeed::new(reqwest::Client::new(), url, config.feed.timeout);
    log::info!("Polling {}", feed.url());
    Some(Ingestor::new(
        Arc::new(feed),
        store,
        Some(observer),
        config.feed.poll_interval,
    ))
}

async fn serve(config: Config, with_ingest: bool, memory: bool) -> ExitCode {
    let Some(store) = open_store(&config, memory) else {
        return ExitCode::FAILURE;
    };
    let projector = match config.projector() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut ingestor = None;
    if with_ingest {
        let Some(mut i) = build_ingestor(&config, store.clone()) else {
            return ExitCode::FAILURE;
        };
        if let Err(e) = i.start() {
            eprintln!("Unable to start ingestion: {}", e);
            return ExitCode::FAILURE;
        }
        ingestor = Some(i);
    }

    let state = AppState {
        store,
        projector,
        query_timeout: config.web.query_timeout,
        ingest: ingestor.as_ref().map(Ingestor::monitor),
    };

    let result = run_server(&config.web.bind, state).await;

    if let Some(mut i) = ingestor {
        i.stop().await;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn ingest(config: Config) -> ExitCode {
    let Some(store) = open_store(&config, false) else {
        return ExitCode::FAILURE;
    };
    let Some(mut ingestor) = build_ingestor(&config, store) else {
        return ExitCode::FAILURE;
    };

    if let Err(e) = ingestor.start() {
        eprintln!("Unable to start ingestion: {}", e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Unable to listen for shutdown signal: {}", e);
    }
    ingestor.stop().await;
    ExitCode::SUCCESS
}

fn status(config: Config) -> ExitCode {
    let Some(store) = open_store(&config, false) else {
        return ExitCode::FAILURE;
    };
    let projector = match config.projector() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match projector.statuses(store.as_ref(), Utc::now()) {
        Ok(statuses) => {
            for s in statuses {
                println!(
                    "{:<8} {:<8} {:<6} {:<24} {:>8.2} km  {}",
                    s.flight_number, s.registration, s.aircraft_type, s.operator, s.distance, s.status
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Query error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(config: &Config) -> ExitCode {
    match (config.observer_point(), config.feed_url()) {
        (Ok(observer), Ok(url)) => {
            println!("Configuration is valid");
            println!(
                "  observer: {:.4}, {:.4}",
                observer.latitude_deg, observer.longitude_deg
            );
            println!("  feed: {} every {:?}", url, config.feed.poll_interval);
            println!("  storage: {}", config.storage.base_folder.display());
            println!("  web: {}", config.web.bind);
            ExitCode::SUCCESS
        }
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Invalid configuration: {}", e);
            ExitCode::FAILURE
        }
    }
}
