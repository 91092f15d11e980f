//! Helpers shared by the site adapters: title cleanup, element lookups and
//! the timestamp formats the supported sites render.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::render::{ElementHandle, RenderSession};

static CN_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})年(\d{1,2})月(\d{1,2})日\s+(\d{1,2}):(\d{2})").expect("valid regex")
});

static CN_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})月(\d{1,2})日\s+(\d{1,2}):(\d{2})").expect("valid regex")
});

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(分钟|小时|天)前").expect("valid regex"));

/// Collapse all whitespace runs into single spaces
pub fn clean_title(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn first_within(
    session: &dyn RenderSession,
    scope: &ElementHandle,
    selector: &str,
) -> Option<ElementHandle> {
    session.find_within(scope, selector).ok()?.into_iter().next()
}

/// Non-empty `href` of a link element
pub fn link_target(link: &ElementHandle) -> Option<String> {
    link.attribute("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Text of the first element matching `selector` on the open page
pub fn page_text(session: &dyn RenderSession, selector: &str) -> Option<String> {
    let element = session.find(selector).ok()?.into_iter().next()?;
    let text = element.text();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// "2025年09月17日 11:30"
pub fn parse_cn_datetime(text: &str) -> Option<NaiveDateTime> {
    let caps = CN_DATETIME.captures(text.trim())?;
    let number = |i: usize| caps[i].parse::<u32>().ok();

    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, number(2)?, number(3)?)?
        .and_hms_opt(number(4)?, number(5)?, 0)
}

pub fn contains_month_day(text: &str) -> bool {
    CN_MONTH_DAY.is_match(text)
}

/// "09月21日 11:27", assumed to be in the year of `now`
pub fn parse_cn_month_day(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = CN_MONTH_DAY.captures(text.trim())?;
    let number = |i: usize| caps[i].parse::<u32>().ok();

    NaiveDate::from_ymd_opt(now.year(), number(1)?, number(2)?)?
        .and_hms_opt(number(3)?, number(4)?, 0)
}

/// "5分钟前", "3小时前", "2天前", counted back from `now`
pub fn parse_relative(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let caps = RELATIVE.captures(text.trim())?;
    let amount: i64 = caps[1].parse().ok()?;

    let offset = match &caps[2] {
        "分钟" => Duration::try_minutes(amount)?,
        "小时" => Duration::try_hours(amount)?,
        "天" => Duration::try_days(amount)?,
        _ => return None,
    };
    now.checked_sub_signed(offset)
}

/// ISO-8601 timestamp. An offset, when present, is dropped keeping the wall-clock time.
pub fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
