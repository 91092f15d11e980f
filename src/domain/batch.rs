use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::record::{time_format, NewsRecord};

/// The artifact produced once per source per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeBatch {
    /// Files merged by older tooling omit it; they read back as scraped now
    #[serde(with = "time_format", default = "scraped_now")]
    pub scrape_time: NaiveDateTime,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub news_list: Vec<NewsRecord>,
}

impl ScrapeBatch {
    pub fn new(news_list: Vec<NewsRecord>, scrape_time: NaiveDateTime) -> Self {
        Self {
            scrape_time,
            total_count: news_list.len(),
            news_list,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.news_list.is_empty()
    }
}

fn scraped_now() -> NaiveDateTime {
    Local::now().naive_local()
}
