//! Pipewright CLI, the main entry point.
//!
//! Commands:
//! - `extract`  : Self-reflecting entity extraction
//! - `chat`     : Function-calling chat (interactive or single message)
//! - `dispatch` : Run a JSON function call without a model
//! - `index`    : Index text files or web pages and list the stored chunks
//! - `search`   : Index sources, then run an embedding search
//! - `rag`      : Index sources, then answer a question from them
//! - `news`     : Summarise the top Hacker News stories

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pipewright",
    about = "Pipewright: extraction, chat and retrieval pipelines",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Documents to index before a query runs.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Text files to index
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Web pages to fetch and index
    #[arg(short, long = "url")]
    pub urls: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract Person/Location/Date entities, reflecting until the model says DONE
    Extract {
        /// Text to extract from (reads stdin when neither --text nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Override the maximum number of generation rounds
        #[arg(long)]
        max_loops: Option<u32>,
    },

    /// Chat with the function-calling agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Dispatch an assistant message holding a JSON function call
    Dispatch {
        /// e.g. {"function": {"name": "get_current_weather", "arguments": {"location": "Boston"}}}
        json: String,
    },

    /// Index documents and print what was stored
    Index {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Index documents, then search them
    Search {
        query: String,

        #[command(flatten)]
        sources: SourceArgs,

        /// Number of documents to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Index documents, then answer a question from them
    Rag {
        question: String,

        #[command(flatten)]
        sources: SourceArgs,

        /// Number of documents to ground the answer on
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Answer in this language and cite the source URL
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Summarise the top Hacker News stories
    News {
        /// Number of stories
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: usize,

        /// Follow each summary with the story URL
        #[arg(long)]
        with_urls: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            text,
            file,
            max_loops,
        } => commands::extract::run(text, file, max_loops).await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Dispatch { json } => commands::dispatch::run(&json).await?,
        Commands::Index { sources } => commands::index::run(&sources).await?,
        Commands::Search {
            query,
            sources,
            top_k,
        } => commands::index::search(&query, &sources, top_k).await?,
        Commands::Rag {
            question,
            sources,
            top_k,
            language,
        } => commands::rag::run(&question, &sources, top_k, language).await?,
        Commands::News { top_k, with_urls } => commands::news::run(top_k, with_urls).await?,
    }

    Ok(())
}
