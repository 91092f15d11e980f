use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::domain::ScrapeBatch;
use crate::errors::{NewsError, NewsResult};
use crate::storage::{read_batch, write_json_atomic};

/// Suffix every per-source artifact carries
pub const ARTIFACT_SUFFIX: &str = "_news.json";
pub const MERGED_ARTIFACT: &str = "news_merged.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output: PathBuf,
    pub merged_files: Vec<PathBuf>,
    pub skipped_files: Vec<PathBuf>,
    pub total_count: usize,
}

/// Combines per-source artifacts of a data directory into one batch
pub struct MergeService {
    data_dir: PathBuf,
}

impl MergeService {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn default_output(&self) -> PathBuf {
        self.data_dir.join(MERGED_ARTIFACT)
    }

    /// Per-source artifacts in file name order
    pub fn artifact_files(&self) -> NewsResult<Vec<PathBuf>> {
        if !self.data_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with(ARTIFACT_SUFFIX))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    pub fn merge(&self) -> NewsResult<MergeReport> {
        self.merge_into(&self.default_output())
    }

    pub fn merge_into(&self, output: &Path) -> NewsResult<MergeReport> {
        let files = self.artifact_files()?;
        let location = self.data_dir.display().to_string();
        if files.is_empty() {
            return Err(NewsError::NothingToMerge(location));
        }

        let mut news_list = Vec::new();
        let mut total_count = 0;
        let mut merged_files = Vec::new();
        let mut skipped_files = Vec::new();

        for path in files {
            match read_batch(&path) {
                Ok(batch) => {
                    info!(file = %path.display(), count = batch.total_count, "Merging artifact");
                    total_count += batch.total_count;
                    news_list.extend(batch.news_list);
                    merged_files.push(path);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable artifact");
                    skipped_files.push(path);
                }
            }
        }

        if news_list.is_empty() {
            return Err(NewsError::NothingToMerge(location));
        }

        let merged = ScrapeBatch {
            scrape_time: Local::now().naive_local(),
            total_count,
            news_list,
        };
        let output = write_json_atomic(output, &merged)?;
        info!(
            output = %output.display(),
            files = merged_files.len(),
            total_count,
            "Merged news artifacts"
        );

        Ok(MergeReport {
            output,
            merged_files,
            skipped_files,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewsRecord;
    use crate::storage::{ArtifactStore, JsonArtifactStore};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn batch(titles: &[&str], source: &str) -> ScrapeBatch {
        let records = titles
            .iter()
            .map(|t| NewsRecord::new(t.to_string(), format!("https://{source}.test/{t}"), source.to_string()))
            .collect();
        let scrape_time = NaiveDate::from_ymd_opt(2025, 9, 20)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ScrapeBatch::new(records, scrape_time)
    }

    #[test]
    fn test_merge_in_file_name_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonArtifactStore::new(temp_dir.path());
        store.write_batch("wallstreetcn_news.json", &batch(&["w1"], "wscn")).unwrap();
        store.write_batch("cls_news.json", &batch(&["c1", "c2"], "cls")).unwrap();
        fs::write(temp_dir.path().join("notes.json"), "{}").unwrap();

        let report = MergeService::new(temp_dir.path()).merge().unwrap();

        assert_eq!(report.total_count, 3);
        assert_eq!(report.merged_files.len(), 2);
        let merged = read_batch(&report.output).unwrap();
        let titles: Vec<&str> = merged.news_list.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["c1", "c2", "w1"]);
        assert_eq!(merged.total_count, 3);
    }

    #[test]
    fn test_merge_skips_unreadable_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonArtifactStore::new(temp_dir.path());
        store.write_batch("jqka_news.json", &batch(&["j1"], "jqka")).unwrap();
        fs::write(temp_dir.path().join("broken_news.json"), "{ not json").unwrap();

        let report = MergeService::new(temp_dir.path()).merge().unwrap();

        assert_eq!(report.total_count, 1);
        assert_eq!(report.skipped_files, vec![temp_dir.path().join("broken_news.json")]);
    }

    #[test]
    fn test_merge_does_not_pick_up_previous_merge() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonArtifactStore::new(temp_dir.path());
        store.write_batch("cls_news.json", &batch(&["c1"], "cls")).unwrap();
        let service = MergeService::new(temp_dir.path());

        service.merge().unwrap();
        let second = service.merge().unwrap();

        assert_eq!(second.total_count, 1);
    }

    #[test]
    fn test_nothing_to_merge() {
        let temp_dir = TempDir::new().unwrap();
        let service = MergeService::new(temp_dir.path());
        assert!(matches!(service.merge(), Err(NewsError::NothingToMerge(_))));

        JsonArtifactStore::new(temp_dir.path())
            .write_batch("cls_news.json", &batch(&[], "cls"))
            .unwrap();
        assert!(matches!(service.merge(), Err(NewsError::NothingToMerge(_))));
        assert!(!service.default_output().exists());
    }

    #[test]
    fn test_merge_into_custom_output() {
        let temp_dir = TempDir::new().unwrap();
        JsonArtifactStore::new(temp_dir.path())
            .write_batch("cls_news.json", &batch(&["c1"], "cls"))
            .unwrap();
        let output = temp_dir.path().join("out").join("all.json");

        let report = MergeService::new(temp_dir.path()).merge_into(&output).unwrap();

        assert_eq!(report.output, output);
        assert!(output.exists());
    }
}
