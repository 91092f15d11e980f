use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{NewsError, NewsResult};

const DB_FILE_NAME: &str = "news.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub page_load_timeout: Duration,
    pub time_range: u32,
    pub max_workers: usize,
    pub max_retry: u32,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Load `.env` from the executable's directory, then from the current directory.
    /// Variables already set in the environment win.
    pub fn load_dotenv() {
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        dotenvy::dotenv().ok();
    }

    pub fn from_env() -> NewsResult<Self> {
        Self::load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> NewsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let db_path = lookup("NEWS_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));

        let page_load_timeout = Duration::from_secs(parse_var(&lookup, "PAGE_LOAD_TIMEOUT", 30)?);

        Ok(Self {
            data_dir,
            db_path,
            page_load_timeout,
            time_range: parse_var(&lookup, "TIME_RANGE", 6)?,
            max_workers: parse_var(&lookup, "MAX_WORKERS", 3)?,
            max_retry: parse_var(&lookup, "MAX_RETRY", 3)?,
        })
    }
}

impl Config {
    /// Point at another data directory; a database path derived from the old one moves along
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        if self.db_path == self.data_dir.join(DB_FILE_NAME) {
            self.db_path = data_dir.join(DB_FILE_NAME);
        }
        self.data_dir = data_dir;
        self
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> NewsResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| NewsError::InvalidEnvVar {
                name: name.to_string(),
                value,
            })
        }
        _ => Ok(default),
    }
}
