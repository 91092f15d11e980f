use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::SourceTask;
use crate::errors::NewsResult;
use crate::render::{RenderSession, SessionFactory};
use crate::services::crawl_service::{CrawlOutcome, CrawlPipeline};

/// Retry `k` waits `BACKOFF_FACTOR * k` backoff units
pub const BACKOFF_FACTOR: u32 = 5;

/// Linear backoff between crawl attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    unit: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Backoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Delay before the 1-indexed retry `retry`; the first attempt never waits
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.unit * BACKOFF_FACTOR.saturating_mul(retry)
    }
}

/// Closes the session when an attempt ends, however it ends
struct SessionGuard {
    session: Box<dyn RenderSession>,
    source: String,
}

impl SessionGuard {
    fn new(session: Box<dyn RenderSession>, source: &str) -> Self {
        Self {
            session,
            source: source.to_string(),
        }
    }

    fn session_mut(&mut self) -> &mut dyn RenderSession {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            warn!(source = %self.source, error = %e, "Failed to close render session");
        }
    }
}

/// Blocks the calling thread for a backoff delay
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

fn thread_sleep(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Runs a source's pipeline until one attempt writes an artifact
#[derive(Clone)]
pub struct RetryController {
    factory: Arc<dyn SessionFactory>,
    pipeline: CrawlPipeline,
    backoff: Backoff,
    sleep: Sleeper,
}

impl RetryController {
    pub fn new(factory: Arc<dyn SessionFactory>, pipeline: CrawlPipeline, backoff: Backoff) -> Self {
        Self {
            factory,
            pipeline,
            backoff,
            sleep: Arc::new(thread_sleep),
        }
    }

    pub fn with_sleeper(mut self, sleep: Sleeper) -> Self {
        self.sleep = sleep;
        self
    }

    /// Artifact path of the first successful attempt, `None` once `max_retry + 1` attempts failed
    pub fn run(&self, task: &SourceTask) -> Option<PathBuf> {
        let source = task.source_name.as_str();
        let attempts = task.max_retry.saturating_add(1);

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.backoff.delay_before(attempt - 1);
                info!(source, attempt, delay_secs = delay.as_secs_f64(), "Retrying after backoff");
                (self.sleep)(delay);
            }

            match self.attempt(task) {
                Ok(CrawlOutcome::Written { path, count }) => {
                    info!(source, attempt, count, "Crawl succeeded");
                    return Some(path);
                }
                Ok(CrawlOutcome::Empty { layout_broken }) => {
                    warn!(source, attempt, attempts, layout_broken, "Crawl produced no news");
                }
                Err(e) => {
                    warn!(source, attempt, attempts, error = %e, "Crawl attempt failed");
                }
            }
        }

        error!(source, attempts, "Giving up on source");
        None
    }

    fn attempt(&self, task: &SourceTask) -> NewsResult<CrawlOutcome> {
        let session = self.factory.create()?;
        let mut guard = SessionGuard::new(session, &task.source_name);
        self.pipeline.run(guard.session_mut(), task)
    }
}
