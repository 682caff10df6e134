use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod query;

use lyrics_enricher_capabilities::HttpEmbeddingProvider;
use lyrics_enricher_repository::{OpenSearchClient, VectorIndexClient};
use lyrics_enricher_shared::{
    Language, ScoredMatch, DEFAULT_LIMIT, DEFAULT_NUM_CANDIDATES,
};
use query::QueryService;

#[derive(Parser)]
#[command(name = "lyrics-query")]
#[command(about = "Search enriched song lyrics by meaning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Vector index URL
    #[arg(long, default_value = "http://localhost:9200")]
    url: String,

    /// Embedding service URL
    #[arg(long, default_value = "http://localhost:8080")]
    embedding_url: String,

    /// Index name
    #[arg(long, default_value = "lyrics")]
    index_name: String,

    /// Maximum matches returned per query
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Nearest-neighbor candidates examined per query
    #[arg(long, default_value_t = DEFAULT_NUM_CANDIDATES)]
    num_candidates: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively search for songs (default)
    Search,
    /// Create the lyrics index with k-NN mappings
    InitIndex,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let index = OpenSearchClient::with_index(&cli.url, &cli.index_name)
        .context("Failed to create index client")?;

    match cli.command.as_ref().unwrap_or(&Commands::Search) {
        Commands::InitIndex => {
            index
                .ensure_index_exists()
                .await
                .context("Failed to create index")?;
            println!("Index '{}' ready", cli.index_name);
            Ok(())
        }
        Commands::Search => run_search(cli, index).await,
    }
}

async fn run_search(cli: Cli, index: OpenSearchClient) -> Result<()> {
    let healthy = index
        .health_check()
        .await
        .context("Failed to reach the vector index")?;
    if !healthy {
        bail!("Vector index is unhealthy");
    }

    println!("## CONNECTED TO VECTOR INDEX ##");

    let embedder = HttpEmbeddingProvider::new(&cli.embedding_url)
        .context("Failed to create embedding client")?;
    let service = QueryService::new(Arc::new(embedder), Arc::new(index));

    let stdin = io::stdin();
    loop {
        let language = match prompt(&stdin, "What is the language of the song? [es, en] - ")? {
            Some(input) => Language::parse(&input),
            None => break,
        };

        let text = match prompt(&stdin, "What do you want the song to talk about? - ")? {
            Some(input) if !input.is_empty() => input,
            Some(_) => continue,
            None => break,
        };

        info!(language = %language, "Running search");

        // A backend failure is reported and the prompt loop continues; an
        // empty result set just prints an empty block.
        let matches = match service
            .search(&text, language, cli.limit, cli.num_candidates)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                eprintln!("Search failed: {:#}", e);
                continue;
            }
        };

        println!("==============");
        for result in &matches {
            print!("{}", format_match(result));
            println!("==============");
        }
    }

    Ok(())
}

/// Print a prompt and read one trimmed line; `None` on end of input.
fn prompt(stdin: &io::Stdin, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    let bytes = stdin.lock().read_line(&mut line)?;
    if bytes == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

/// Render one match as a display block.
fn format_match(result: &ScoredMatch) -> String {
    let mut block = String::new();

    if let Some(artist) = &result.artist {
        block.push_str(&format!("artist: {}\n", artist));
    }
    if let Some(title) = &result.title {
        block.push_str(&format!("title: {}\n", title));
    }
    if let Some(year) = result.year {
        block.push_str(&format!("year: {}\n", year));
    }
    if let Some(genre) = &result.genre {
        block.push_str(&format!("genre: {}\n", genre));
    }
    if !result.tags.is_empty() {
        block.push_str(&format!("tags: {}\n", result.tags.join(", ")));
    }
    block.push_str(&format!("lyrics: {}\n", result.lyrics));
    block.push_str(&format!("score: {:.4}\n", result.score));

    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_match_full() {
        let result = ScoredMatch {
            artist: Some("The Example Band".to_string()),
            title: Some("Love Song".to_string()),
            year: Some(1985),
            genre: Some("pop".to_string()),
            tags: vec!["love".to_string(), "baby".to_string()],
            lyrics: "I love you baby".to_string(),
            score: 0.9234,
        };

        let block = format_match(&result);

        assert!(block.contains("artist: The Example Band\n"));
        assert!(block.contains("year: 1985\n"));
        assert!(block.contains("tags: love, baby\n"));
        assert!(block.contains("score: 0.9234\n"));
    }

    #[test]
    fn test_format_match_omits_missing_fields() {
        let result = ScoredMatch {
            artist: None,
            title: None,
            year: None,
            genre: None,
            tags: vec![],
            lyrics: "la la la".to_string(),
            score: 0.5,
        };

        let block = format_match(&result);

        assert!(!block.contains("artist:"));
        assert!(!block.contains("tags:"));
        assert!(block.contains("lyrics: la la la\n"));
    }
}
