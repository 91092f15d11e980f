use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::domain::{NewsRecord, ScrapeBatch};
use crate::errors::NewsResult;

#[cfg_attr(test, mockall::automock)]
pub trait ArtifactStore: Send + Sync {
    /// Persist `batch` under `name`, returning the final path.
    /// A partially written file never appears under the final name.
    fn write_batch(&self, name: &str, batch: &ScrapeBatch) -> NewsResult<PathBuf>;
}

#[cfg_attr(test, mockall::automock)]
pub trait NewsRepository: Send + Sync {
    /// Insert records whose url is not stored yet; returns how many were inserted
    fn insert_batch(&self, records: &[NewsRecord]) -> NewsResult<usize>;
    fn exists(&self, url: &str) -> NewsResult<bool>;
    fn get_by_source(&self, source: &str, limit: usize) -> NewsResult<Vec<NewsRecord>>;
    fn get_by_time_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> NewsResult<Vec<NewsRecord>>;
    /// Records whose title or content contains `keyword`, newest first
    fn search_by_keyword(&self, keyword: &str, limit: usize) -> NewsResult<Vec<NewsRecord>>;
    fn latest(&self, limit: usize) -> NewsResult<Vec<NewsRecord>>;
    /// `(source, count)` pairs, largest first
    fn count_by_source(&self) -> NewsResult<Vec<(String, usize)>>;
    /// Delete records timed before `cutoff`; returns how many were removed
    fn delete_older_than(&self, cutoff: NaiveDateTime) -> NewsResult<usize>;
    fn count(&self) -> NewsResult<usize>;
}
