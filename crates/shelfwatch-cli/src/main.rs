use std::path::PathBuf;

use clap::{Parser, Subcommand};

use shelfwatch_core::ScrapeSettings;
use shelfwatch_scraper::ScrapeOrchestrator;

#[derive(Debug, Parser)]
#[command(name = "shelfwatch-cli")]
#[command(about = "Shelfwatch command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one scrape and write the record list to a JSON document.
    Scrape {
        /// Number of catalog pages to crawl (defaults to the configured budget).
        #[arg(long)]
        max_pages: Option<u32>,
        /// Output document path (defaults to SHELFWATCH_OUTPUT_PATH).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape { max_pages, output } => run_scrape(max_pages, output).await,
    }
}

async fn run_scrape(max_pages: Option<u32>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = shelfwatch_core::load_app_config()?;
    let output_path = output.unwrap_or_else(|| config.output_path.clone());

    let orchestrator = ScrapeOrchestrator::from_config(&config)?;
    let settings = ScrapeSettings { max_pages };

    let products = orchestrator.run(&settings).await?;
    let body = serde_json::to_vec_pretty(&products)?;
    tokio::fs::write(&output_path, body).await?;

    tracing::info!(
        count = products.len(),
        output = %output_path.display(),
        "scrape complete"
    );
    println!("Scraped {} products -> {}", products.len(), output_path.display());

    Ok(())
}
