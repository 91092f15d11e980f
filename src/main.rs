use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsgather::cli::{Cli, Commands};
use newsgather::config::Config;
use newsgather::errors::NewsError;
use newsgather::render::StaticSessionFactory;
use newsgather::services::{ArchiveService, MergeService, NewsQuery, Orchestrator, RunConfig};
use newsgather::sources::SourceRegistry;
use newsgather::storage::{parse_time_bound, JsonArtifactStore, SqliteNewsRepository, SqliteStorage};

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("failed to initialize logging")
}

fn run() -> Result<ExitCode> {
    // .env must be loaded before clap reads env fallbacks
    Config::load_dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }

    match cli.command {
        Commands::Run {
            websites,
            time_range,
            max_workers,
            max_retry,
            no_merge,
            retry_empty,
        } => {
            let registry = SourceRegistry::new();
            let run_config = RunConfig {
                websites: if websites.is_empty() {
                    registry.names()
                } else {
                    websites
                },
                time_range: time_range.unwrap_or(config.time_range),
                max_workers: max_workers.unwrap_or(config.max_workers),
                max_retry: max_retry.unwrap_or(config.max_retry),
                retry_on_empty: retry_empty,
            };
            cmd_run(&config, registry, run_config, !no_merge)
        }
        Commands::Merge { output } => cmd_merge(&config, output),
        Commands::Sources => cmd_sources(),
        Commands::Store { file } => cmd_store(&config, &file),
        Commands::Query {
            keyword,
            source,
            since,
            until,
            limit,
        } => cmd_query(&config, keyword, source, since, until, limit),
        Commands::Stats => cmd_stats(&config),
        Commands::Prune { days } => cmd_prune(&config, days),
    }
}

fn cmd_run(config: &Config, registry: SourceRegistry, run_config: RunConfig, merge: bool) -> Result<ExitCode> {
    // Reject bad ranges before anything else starts
    run_config.validate()?;

    let orchestrator = Orchestrator::new(
        registry,
        Arc::new(StaticSessionFactory::new(config.page_load_timeout)),
        Arc::new(JsonArtifactStore::new(&config.data_dir)),
    );
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let summary = runtime.block_on(orchestrator.run(&run_config))?;

    println!(
        "\nCrawled {} sources: {} succeeded, {} failed",
        summary.total(),
        summary.succeeded.len(),
        summary.failed.len()
    );
    for (source, path) in &summary.succeeded {
        println!("  + {} -> {}", source, path.display());
    }
    for source in &summary.failed {
        println!("  ! {}", source);
    }

    if summary.is_total_failure() {
        eprintln!("All sources failed.");
        return Ok(ExitCode::FAILURE);
    }

    if merge {
        merge_artifacts(&MergeService::new(&config.data_dir), None)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_merge(config: &Config, output: Option<PathBuf>) -> Result<ExitCode> {
    merge_artifacts(&MergeService::new(&config.data_dir), output)?;
    Ok(ExitCode::SUCCESS)
}

fn merge_artifacts(service: &MergeService, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| service.default_output());

    match service.merge_into(&output) {
        Ok(report) => {
            println!(
                "Merged {} news from {} files into {}",
                report.total_count,
                report.merged_files.len(),
                report.output.display()
            );
            for skipped in &report.skipped_files {
                println!("  ! skipped unreadable {}", skipped.display());
            }
            Ok(())
        }
        Err(NewsError::NothingToMerge(dir)) => {
            println!("Nothing to merge in {}", dir);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_sources() -> Result<ExitCode> {
    let registry = SourceRegistry::new();

    println!("Known sources:\n");
    for source in registry.all() {
        println!("  {}", source.name());
        let aliases = source.aliases();
        if !aliases.is_empty() {
            println!("    Aliases: {}", aliases.join(", "));
        }
        println!("    Artifact: {}", source.artifact_name());
    }

    Ok(ExitCode::SUCCESS)
}

fn open_archive(config: &Config) -> Result<ArchiveService<SqliteNewsRepository>> {
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    Ok(ArchiveService::new(SqliteNewsRepository::new(storage)))
}

fn cmd_store(config: &Config, file: &Path) -> Result<ExitCode> {
    let archive = open_archive(config)?;
    let result = archive.import_file(file)?;

    println!(
        "Stored {} new records from {} ({} already present)",
        result.inserted,
        file.display(),
        result.duplicates()
    );
    println!("Database now holds {} records.", archive.count()?);

    Ok(ExitCode::SUCCESS)
}

fn cmd_query(
    config: &Config,
    keyword: Option<String>,
    source: Option<String>,
    since: Option<String>,
    until: Option<String>,
    limit: usize,
) -> Result<ExitCode> {
    let source = match source {
        Some(name) => Some(SourceRegistry::new().get(&name)?.name().to_string()),
        None => None,
    };
    let query = NewsQuery {
        keyword,
        source,
        since: since.map(|s| parse_time_bound(&s, false)).transpose()?,
        until: until.map(|s| parse_time_bound(&s, true)).transpose()?,
        limit: Some(limit),
    };
    let records = open_archive(config)?.query(&query)?;

    if records.is_empty() {
        println!("No stored news matched.");
        return Ok(ExitCode::SUCCESS);
    }

    for record in records {
        println!(
            "[{}] {} | {}",
            record.formatted_time().unwrap_or_else(|| "-".to_string()),
            record.source,
            record.title
        );
        println!("    {}", record.url);
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_stats(config: &Config) -> Result<ExitCode> {
    let stats = open_archive(config)?.stats()?;

    println!("Stored news: {}", stats.total);
    for (source, count) in &stats.by_source {
        println!("  {:<12} {}", source, count);
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_prune(config: &Config, days: u32) -> Result<ExitCode> {
    let archive = open_archive(config)?;
    let deleted = archive.prune(days, Local::now().naive_local())?;

    println!("Deleted {} records older than {} days.", deleted, days);
    println!("Database now holds {} records.", archive.count()?);

    Ok(ExitCode::SUCCESS)
}
