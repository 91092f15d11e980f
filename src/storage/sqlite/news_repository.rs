use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Row};

use crate::domain::{NewsRecord, TIME_FORMAT};
use crate::errors::{NewsError, NewsResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::NewsRepository;

pub struct SqliteNewsRepository {
    storage: SqliteStorage,
}

impl SqliteNewsRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<NewsRecord> {
        let time: String = row.get(3)?;
        Ok(NewsRecord {
            title: row.get(0)?,
            url: row.get(1)?,
            source: row.get(2)?,
            time: NaiveDateTime::parse_from_str(&time, TIME_FORMAT).ok(),
            content: row.get(4)?,
        })
    }
}

impl NewsRepository for SqliteNewsRepository {
    fn insert_batch(&self, records: &[NewsRecord]) -> NewsResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let stored_at = Local::now().naive_local().format(TIME_FORMAT).to_string();
        let mut conn = self.storage.connection()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO news (title, url, source, time, content) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                let time = record.formatted_time().unwrap_or_else(|| stored_at.clone());
                inserted += stmt.execute(params![
                    record.title,
                    record.url,
                    record.source,
                    time,
                    record.content,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn exists(&self, url: &str) -> NewsResult<bool> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM news WHERE url = ?1)")?;
        let exists: bool = stmt.query_row([url], |row| row.get(0))?;
        Ok(exists)
    }

    fn get_by_source(&self, source: &str, limit: usize) -> NewsResult<Vec<NewsRecord>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT title, url, source, time, content FROM news WHERE source = ?1 ORDER BY time DESC, id DESC LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![source, sql_limit(limit)], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get_by_time_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> NewsResult<Vec<NewsRecord>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT title, url, source, time, content FROM news WHERE time >= ?1 AND time <= ?2 ORDER BY time DESC, id DESC",
        )?;
        let records = stmt
            .query_map(
                params![
                    start.format(TIME_FORMAT).to_string(),
                    end.format(TIME_FORMAT).to_string()
                ],
                Self::row_to_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn search_by_keyword(&self, keyword: &str, limit: usize) -> NewsResult<Vec<NewsRecord>> {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT title, url, source, time, content FROM news WHERE title LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\' ORDER BY time DESC, id DESC LIMIT ?2",
        )?;
        let records = stmt
            .query_map(params![pattern, sql_limit(limit)], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn latest(&self, limit: usize) -> NewsResult<Vec<NewsRecord>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT title, url, source, time, content FROM news ORDER BY time DESC, id DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map([sql_limit(limit)], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_by_source(&self) -> NewsResult<Vec<(String, usize)>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT source, COUNT(*) AS total FROM news GROUP BY source ORDER BY total DESC, source ASC",
        )?;
        let counts = stmt
            .query_map([], |row| {
                let total: i64 = row.get(1)?;
                Ok((row.get(0)?, total.max(0) as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn delete_older_than(&self, cutoff: NaiveDateTime) -> NewsResult<usize> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute(
            "DELETE FROM news WHERE time < ?1",
            [cutoff.format(TIME_FORMAT).to_string()],
        )?;
        Ok(deleted)
    }

    fn count(&self) -> NewsResult<usize> {
        let conn = self.storage.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escape LIKE wildcards so the keyword matches literally
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Parse a query bound. A bare `YYYY-MM-DD` covers the whole day, so it
/// becomes midnight as a start bound and 23:59:59 as an end bound.
pub fn parse_time_bound(text: &str, is_end: bool) -> NewsResult<NaiveDateTime> {
    let text = text.trim();
    if let Ok(time) = NaiveDateTime::parse_from_str(text, TIME_FORMAT) {
        return Ok(time);
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| NewsError::InvalidTime(text.to_string()))?;
    let time = if is_end {
        NaiveTime::from_hms_opt(23, 59, 59)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    time.map(|t| date.and_time(t))
        .ok_or_else(|| NewsError::InvalidTime(text.to_string()))
}
