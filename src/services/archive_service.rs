use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::domain::NewsRecord;
use crate::errors::NewsResult;
use crate::storage::read_batch;
use crate::storage::traits::NewsRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub read: usize,
    pub inserted: usize,
}

impl ImportResult {
    pub fn duplicates(&self) -> usize {
        self.read - self.inserted
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    /// Matched against title and content
    pub keyword: Option<String>,
    pub source: Option<String>,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub total: usize,
    pub by_source: Vec<(String, usize)>,
}

/// Long-term storage of crawled news
pub struct ArchiveService<R: NewsRepository> {
    repository: R,
}

impl<R: NewsRepository> ArchiveService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Load a batch or merged artifact, skipping urls already stored
    pub fn import_file(&self, path: &Path) -> NewsResult<ImportResult> {
        let batch = read_batch(path)?;
        let read = batch.news_list.len();
        let inserted = self.repository.insert_batch(&batch.news_list)?;

        info!(file = %path.display(), read, inserted, "Imported news into store");
        Ok(ImportResult { read, inserted })
    }

    /// Without any filter this returns the newest records
    pub fn query(&self, query: &NewsQuery) -> NewsResult<Vec<NewsRecord>> {
        let limit = query.limit.unwrap_or(usize::MAX);
        let mut records = match (&query.keyword, &query.source) {
            (Some(keyword), _) => self.repository.search_by_keyword(keyword, usize::MAX)?,
            (None, Some(source)) => self.repository.get_by_source(source, usize::MAX)?,
            (None, None) if query.since.is_some() || query.until.is_some() => self
                .repository
                .get_by_time_range(query.since.unwrap_or_else(far_past), query.until.unwrap_or_else(far_future))?,
            (None, None) => return self.repository.latest(limit),
        };

        records.retain(|record| {
            let source_matches = query.source.as_ref().map_or(true, |source| &record.source == source);
            let time_matches = match record.time {
                Some(time) => {
                    query.since.map_or(true, |since| time >= since)
                        && query.until.map_or(true, |until| time <= until)
                }
                None => true,
            };
            source_matches && time_matches
        });
        records.truncate(limit);
        Ok(records)
    }

    pub fn stats(&self) -> NewsResult<ArchiveStats> {
        Ok(ArchiveStats {
            total: self.repository.count()?,
            by_source: self.repository.count_by_source()?,
        })
    }

    /// Delete records older than `days` days before `now`
    pub fn prune(&self, days: u32, now: NaiveDateTime) -> NewsResult<usize> {
        let cutoff = now - Duration::days(i64::from(days));
        let deleted = self.repository.delete_older_than(cutoff)?;
        info!(days, cutoff = %cutoff, deleted, "Pruned old news");
        Ok(deleted)
    }

    pub fn count(&self) -> NewsResult<usize> {
        self.repository.count()
    }
}

fn far_past() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn far_future() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .unwrap_or_default()
}
