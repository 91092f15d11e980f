use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::domain::{RunSummary, SourceTask};
use crate::errors::{NewsError, NewsResult};
use crate::render::SessionFactory;
use crate::services::crawl_service::{CrawlPipeline, PipelineSettings};
use crate::services::retry_service::{Backoff, RetryController};
use crate::sources::SourceRegistry;
use crate::storage::ArtifactStore;

pub const MAX_WORKERS_RANGE: RangeInclusive<usize> = 1..=10;
pub const TIME_RANGE_HOURS: RangeInclusive<u32> = 1..=24;
pub const MAX_RETRY_RANGE: RangeInclusive<u32> = 0..=10;

/// What one crawl run should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Display names or aliases of the sources to crawl
    pub websites: Vec<String>,
    /// Keep news newer than this many hours
    pub time_range: u32,
    pub max_workers: usize,
    pub max_retry: u32,
    pub retry_on_empty: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            websites: Vec::new(),
            time_range: 6,
            max_workers: 3,
            max_retry: 3,
            retry_on_empty: false,
        }
    }
}

impl RunConfig {
    /// Reject out-of-range values; nothing is clamped
    pub fn validate(&self) -> NewsResult<()> {
        if !MAX_WORKERS_RANGE.contains(&self.max_workers) {
            return Err(NewsError::Config(format!(
                "max_workers must be between {} and {}, got {}",
                MAX_WORKERS_RANGE.start(),
                MAX_WORKERS_RANGE.end(),
                self.max_workers
            )));
        }
        if !TIME_RANGE_HOURS.contains(&self.time_range) {
            return Err(NewsError::Config(format!(
                "time_range must be between {} and {} hours, got {}",
                TIME_RANGE_HOURS.start(),
                TIME_RANGE_HOURS.end(),
                self.time_range
            )));
        }
        if !MAX_RETRY_RANGE.contains(&self.max_retry) {
            return Err(NewsError::Config(format!(
                "max_retry must be between {} and {}, got {}",
                MAX_RETRY_RANGE.start(),
                MAX_RETRY_RANGE.end(),
                self.max_retry
            )));
        }
        Ok(())
    }

    pub fn time_cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now - ChronoDuration::hours(i64::from(self.time_range))
    }
}

/// Crawls many sources at once with a bounded number of workers
pub struct Orchestrator {
    registry: SourceRegistry,
    factory: Arc<dyn SessionFactory>,
    store: Arc<dyn ArtifactStore>,
    settings: PipelineSettings,
    backoff: Backoff,
}

impl Orchestrator {
    pub fn new(
        registry: SourceRegistry,
        factory: Arc<dyn SessionFactory>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            registry,
            factory,
            store,
            settings: PipelineSettings::default(),
            backoff: Backoff::default(),
        }
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Resolve requested websites to tasks. Unknown names are skipped.
    pub fn build_tasks(&self, config: &RunConfig, cutoff: NaiveDateTime) -> NewsResult<Vec<SourceTask>> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for website in &config.websites {
            let Some(adapter) = self.registry.find(website) else {
                warn!(website = %website, "Unknown website, skipping");
                continue;
            };
            let source_name = adapter.name().to_string();
            if !seen.insert(source_name.clone()) {
                continue;
            }
            tasks.push(SourceTask {
                source_name,
                adapter,
                time_cutoff: cutoff,
                max_retry: config.max_retry,
            });
        }

        if tasks.is_empty() {
            return Err(NewsError::NoWork(format!(
                "none of the requested websites are known: {}",
                config.websites.join(", ")
            )));
        }
        Ok(tasks)
    }

    pub async fn run(&self, config: &RunConfig) -> NewsResult<RunSummary> {
        config.validate()?;
        let cutoff = config.time_cutoff(Local::now().naive_local());
        let tasks = self.build_tasks(config, cutoff)?;

        info!(
            sources = tasks.len(),
            max_workers = config.max_workers,
            cutoff = %cutoff,
            "Starting crawl run"
        );

        let settings = PipelineSettings {
            retry_on_empty: config.retry_on_empty,
            ..self.settings.clone()
        };
        let controller = RetryController::new(
            Arc::clone(&self.factory),
            CrawlPipeline::new(Arc::clone(&self.store), settings),
            self.backoff,
        );
        let semaphore = Arc::new(Semaphore::new(config.max_workers));
        let mut join_set = JoinSet::new();
        let mut names = HashMap::new();

        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let controller = controller.clone();
            let name = task.source_name.clone();
            let handle = join_set.spawn(async move {
                let source = task.source_name.clone();
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (source, Ok(None));
                };
                let result = tokio::task::spawn_blocking(move || controller.run(&task)).await;
                (source, result)
            });
            names.insert(handle.id(), name);
        }

        let mut summary = RunSummary::default();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((source, outcome)) => record_outcome(&mut summary, source, outcome),
                Err(e) => record_unjoined(&mut summary, &names, e),
            }
        }

        log_summary(&summary);
        Ok(summary)
    }
}

fn record_outcome(summary: &mut RunSummary, source: String, outcome: Result<Option<PathBuf>, JoinError>) {
    match outcome {
        Ok(Some(path)) => summary.record_success(source, path),
        Ok(None) => summary.record_failure(source),
        Err(e) => {
            error!(source = %source, error = %e, "Crawl task panicked");
            summary.record_failure(source);
        }
    }
}

/// The worker task itself died, so its source is only known by task id
fn record_unjoined(summary: &mut RunSummary, names: &HashMap<Id, String>, error: JoinError) {
    match names.get(&error.id()) {
        Some(source) => {
            error!(source = %source, error = %error, "Crawl task could not be joined");
            summary.record_failure(source.clone());
        }
        None => error!(error = %error, "Unknown crawl task could not be joined"),
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        total = summary.total(),
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "Crawl run finished"
    );
    for (source, path) in &summary.succeeded {
        info!(source = %source, path = %path.display(), "Source succeeded");
    }
    if !summary.failed.is_empty() {
        warn!(failed = %summary.failed.join(", "), "Some sources failed");
    }
    if summary.is_total_failure() {
        error!("All sources failed");
    }
}
