use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use lyrics_enricher::{Dependencies, EnricherError};
use lyrics_enricher_pipeline::processor::DEFAULT_POOL_CAPACITY;
use lyrics_enricher_shared::Language;

#[derive(Parser)]
#[command(name = "lyrics-enricher")]
#[command(about = "Consumes lyrics change events, enriches them with embeddings and tags, and republishes them", long_about = None)]
struct Cli {
    /// Language-specific input partition [english, spanish]
    #[arg(short, long)]
    language: String,

    /// Number of concurrent enrichment tasks
    #[arg(short, long, default_value_t = DEFAULT_POOL_CAPACITY)]
    workers: usize,

    /// Kafka client-properties file
    #[arg(long)]
    properties_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), EnricherError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let language = Language::parse(&cli.language);

    info!(
        language = %language,
        input_topic = %language.input_topic(),
        workers = cli.workers,
        "Starting lyrics enricher"
    );

    let mut deps = Dependencies::new(language, cli.workers, cli.properties_file)?;
    deps.orchestrator.run().await?;

    Ok(())
}
