use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::sources::SourceAdapter;

/// One source to crawl in a run.
#[derive(Clone)]
pub struct SourceTask {
    pub source_name: String,
    pub adapter: Arc<dyn SourceAdapter>,
    pub time_cutoff: NaiveDateTime,
    pub max_retry: u32,
}

impl std::fmt::Debug for SourceTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTask")
            .field("source_name", &self.source_name)
            .field("time_cutoff", &self.time_cutoff)
            .field("max_retry", &self.max_retry)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<(String, PathBuf)>,
    pub failed: Vec<String>,
}

impl RunSummary {
    pub fn record_success(&mut self, source: String, artifact: PathBuf) {
        self.succeeded.push((source, artifact));
    }

    pub fn record_failure(&mut self, source: String) {
        self.failed.push(source);
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when no source produced an artifact.
    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty()
    }
}
