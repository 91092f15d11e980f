use chrono::NaiveDateTime;

use crate::domain::NewsRecord;
use crate::render::{ElementHandle, RenderSession};

/// How a source reveals items beyond the first screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPageKind {
    /// Distinct list-page URLs, one per page
    Paginated,
    /// One URL with an in-place "load more" affordance
    IncrementalLoad(LoadMore),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMore {
    pub selector: String,
    /// Text the affordance must contain, when the selector alone is ambiguous
    pub label: Option<String>,
    pub max_clicks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLocator {
    /// Container that must exist on a healthy list page. `None` queries the whole page.
    pub container: Option<String>,
    pub item: String,
}

/// Draft derived from one list item; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub time: Option<NaiveDateTime>,
}

impl ParsedItem {
    /// Accept the draft only when title, url and source are all non-empty
    pub fn into_record(self) -> Option<NewsRecord> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let url = self.url.filter(|u| !u.is_empty())?;
        let source = self.source.filter(|s| !s.is_empty())?;

        Some(NewsRecord::new(title, url, source).with_time(self.time))
    }
}

pub trait SourceAdapter: Send + Sync {
    /// Display name, also written as each record's `source`
    fn name(&self) -> &str;

    /// Short ASCII names accepted on the command line
    fn aliases(&self) -> Vec<&str> {
        vec![]
    }

    fn list_page_urls(&self) -> Vec<String>;

    fn list_page_kind(&self) -> ListPageKind;

    fn item_locator(&self) -> ItemLocator;

    /// Derive a draft from one list item. `now` anchors relative timestamps.
    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        now: NaiveDateTime,
    ) -> ParsedItem;

    /// Extract the article body from the currently open article page
    fn parse_content(&self, session: &dyn RenderSession) -> Option<String>;

    /// File name of this source's artifact, ending in `_news.json`
    fn artifact_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_draft_is_accepted() {
        let item = ParsedItem {
            title: Some("Title".to_string()),
            url: Some("https://example.com/1".to_string()),
            source: Some("example".to_string()),
            time: None,
        };

        let record = item.into_record().unwrap();
        assert_eq!(record.title, "Title");
        assert!(record.time.is_none());
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        let base = ParsedItem {
            title: Some("Title".to_string()),
            url: Some("https://example.com/1".to_string()),
            source: Some("example".to_string()),
            time: None,
        };

        let no_title = ParsedItem {
            title: Some(String::new()),
            ..base.clone()
        };
        let no_url = ParsedItem {
            url: None,
            ..base.clone()
        };
        let no_source = ParsedItem {
            source: None,
            ..base
        };

        assert!(no_title.into_record().is_none());
        assert!(no_url.into_record().is_none());
        assert!(no_source.into_record().is_none());
    }
}
