use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsgather")]
#[command(about = "Concurrent multi-source financial news crawler")]
#[command(version)]
pub struct Cli {
    /// Directory holding per-source artifacts and the merged file
    #[arg(long, global = true, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the selected sources, then merge their artifacts
    Run {
        /// Comma-separated source names or aliases (all sources when omitted)
        #[arg(short, long, value_delimiter = ',')]
        websites: Vec<String>,

        /// Keep news published within this many hours (1-24)
        #[arg(short, long)]
        time_range: Option<u32>,

        /// Sources crawled at the same time (1-10)
        #[arg(short = 'j', long)]
        max_workers: Option<usize>,

        /// Extra attempts per source after the first (0-10)
        #[arg(short = 'r', long)]
        max_retry: Option<u32>,

        /// Skip merging artifacts after the crawl
        #[arg(long)]
        no_merge: bool,

        /// Retry every empty result, not only pages whose layout looks broken
        #[arg(long)]
        retry_empty: bool,
    },

    /// Merge per-source artifacts into one file
    Merge {
        /// Output file path (defaults to news_merged.json in the data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List known sources
    Sources,

    /// Load a batch or merged JSON file into the news database
    Store {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Show news stored in the database
    Query {
        /// Text to look for in titles and content
        #[arg(short, long)]
        keyword: Option<String>,

        /// Only this source (display name or alias)
        #[arg(short, long)]
        source: Option<String>,

        /// Earliest time, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
        #[arg(long)]
        since: Option<String>,

        /// Latest time, YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
        #[arg(long)]
        until: Option<String>,

        /// Maximum number of records to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show how many records each source has in the database
    Stats,

    /// Delete stored news older than the given number of days
    Prune {
        /// Age limit in days
        #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,
    },
}
