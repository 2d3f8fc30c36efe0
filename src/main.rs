//! # Recipe Index CLI (`recipe-index`)
//!
//! ## Usage
//!
//! ```bash
//! recipe-index --config ./config/recipes.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recipe-index reset` | Delete and regenerate the vector store |
//! | `recipe-index search "<query>"` | Print the closest recipes |
//! | `recipe-index serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use recipe_index::config;
use recipe_index::embedding::create_provider;
use recipe_index::progress::ProgressMode;
use recipe_index::{rebuild, search, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Recipe Index: embedding index and nearest-neighbour search for a recipe corpus.
#[derive(Parser)]
#[command(name = "recipe-index", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recipes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete the vector store and re-embed the whole corpus.
    ///
    /// Recipes whose embedding fails are reported and left out of the store.
    Reset {
        /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Search the vector store.
    Search {
        /// The search query string.
        query: String,

        /// Print results as a JSON array instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recipe_index=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Reset { progress } => {
            let provider = create_provider(&cfg.embedding)?;
            let reporter = progress.unwrap_or_else(ProgressMode::default_for_tty).reporter();
            let summary = rebuild::run_reset(&cfg, provider.as_ref(), reporter.as_ref()).await?;
            println!("reset");
            println!("  total recipes: {}", summary.total);
            println!("  embedded: {}", summary.embedded);
            println!("  failed: {}", summary.failed);
        }
        Commands::Search { query, json } => {
            let provider = create_provider(&cfg.embedding)?;
            let hits = search::search_recipes(&cfg, provider.as_ref(), &query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No results.");
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!(
                        "{}. [{:.4}] {} ({})",
                        i + 1,
                        hit.distance,
                        hit.recipe.title,
                        hit.recipe.id
                    );
                    if !hit.recipe.description.is_empty() {
                        println!("    {}", hit.recipe.description);
                    }
                }
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
