use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use empress_cup_crawler::{
    config::CrawlerConfig,
    crawler::{parse_blocks, CrawlOutcome, ScheduleCrawler},
    match_blocks::extract_match_blocks,
    store::{MatchStore, MemoryMatchStore, PgMatchStore},
    web::{self, AppState},
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the POST /crawl trigger (default)
    Serve,
    /// Run a single crawl and exit
    CrawlOnce {
        /// Parse and report without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse a saved schedule page and print the matches as JSON
    ParseFile {
        /// Path to the HTML file to parse
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = CrawlerConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::CrawlOnce { dry_run } => crawl_once(config, dry_run).await,
        Commands::ParseFile { file } => parse_file(&file),
    }
}

async fn serve(config: CrawlerConfig) -> Result<()> {
    let store = Arc::new(
        PgMatchStore::connect(&config.database)
            .await
            .context("Failed to connect to match database")?,
    );
    let crawler = ScheduleCrawler::new(&config.scraping, store.clone())
        .context("Failed to create crawler")?;
    info!("Crawling {}", crawler.schedule_url());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = AppState {
        crawler: Arc::new(crawler),
    };
    web::serve(listener, state, shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    Ok(())
}

async fn crawl_once(config: CrawlerConfig, dry_run: bool) -> Result<()> {
    let memory = Arc::new(MemoryMatchStore::new());
    let pg = if dry_run {
        None
    } else {
        Some(Arc::new(PgMatchStore::connect(&config.database).await?))
    };
    let store: Arc<dyn MatchStore> = match &pg {
        Some(pg) => pg.clone() as Arc<dyn MatchStore>,
        None => memory.clone() as Arc<dyn MatchStore>,
    };

    let crawler = ScheduleCrawler::new(&config.scraping, store)?;
    let outcome = crawler.run().await;

    if let Some(pg) = &pg {
        pg.close().await;
    }

    match outcome? {
        CrawlOutcome::NoUpdates => info!("No updates"),
        CrawlOutcome::Updated {
            matches_updated,
            timestamp,
        } => {
            info!("Updated {} matches at {}", matches_updated, timestamp.to_rfc3339());
            if dry_run {
                let records: Vec<_> = memory.snapshot().into_values().map(|s| s.record).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
        }
    }
    Ok(())
}

fn parse_file(path: &Path) -> Result<()> {
    let html = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    info!("Parsing {:?}", path);

    let blocks = extract_match_blocks(&html);
    let matches = parse_blocks(&blocks);
    if matches.is_empty() {
        warn!("No matches found in {:?}", path);
    }

    let records: Vec<_> = matches.into_values().collect();
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
