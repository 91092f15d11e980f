use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::ScrapeBatch;
use crate::errors::NewsResult;
use crate::storage::traits::ArtifactStore;

/// Writes each batch as pretty-printed JSON inside one data directory
#[derive(Debug, Clone)]
pub struct JsonArtifactStore {
    data_dir: PathBuf,
}

impl JsonArtifactStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }
}

impl ArtifactStore for JsonArtifactStore {
    fn write_batch(&self, name: &str, batch: &ScrapeBatch) -> NewsResult<PathBuf> {
        write_json_atomic(&self.data_dir.join(name), batch)
    }
}

/// Serialize to a temp file next to `path`, then rename it into place
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> NewsResult<PathBuf> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    debug!(path = %path.display(), "Wrote artifact");
    Ok(path.to_path_buf())
}

pub fn read_batch(path: &Path) -> NewsResult<ScrapeBatch> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewsRecord;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn batch() -> ScrapeBatch {
        let scrape_time = NaiveDate::from_ymd_opt(2025, 9, 21)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ScrapeBatch::new(
            vec![NewsRecord::new(
                "沪指收涨".to_string(),
                "https://example.com/1".to_string(),
                "同花顺".to_string(),
            )
            .with_content(Some("正文".to_string()))],
            scrape_time,
        )
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonArtifactStore::new(temp_dir.path().join("data"));

        let path = store.write_batch("jqka_news.json", &batch()).unwrap();

        assert_eq!(path, temp_dir.path().join("data").join("jqka_news.json"));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("沪指收涨"), "non-ASCII text is written unescaped");
        assert_eq!(read_batch(&path).unwrap(), batch());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonArtifactStore::new(temp_dir.path());

        store.write_batch("cls_news.json", &batch()).unwrap();
        store.write_batch("cls_news.json", &batch()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
