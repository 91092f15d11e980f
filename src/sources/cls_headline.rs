use chrono::NaiveDateTime;

use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{clean_title, link_target, page_text};
use crate::sources::traits::{ItemLocator, ListPageKind, ParsedItem, SourceAdapter};

/// Shorter strings are labels rather than headlines
const MIN_TITLE_CHARS: usize = 6;

/// Marker of the relative timestamp line under each headline
const HOURS_AGO: &str = "小时前";

/// Pinned headlines at the top of the CLS in-depth column. They carry no timestamp.
pub struct ClsHeadlineSource;

impl ClsHeadlineSource {
    pub fn new() -> Self {
        Self
    }

    fn is_headline(text: &str) -> bool {
        text.chars().count() >= MIN_TITLE_CHARS
    }
}

impl Default for ClsHeadlineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ClsHeadlineSource {
    fn name(&self) -> &str {
        "财联社头条"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["cls_headline"]
    }

    fn list_page_urls(&self) -> Vec<String> {
        vec!["https://www.cls.cn/depth?id=1000".to_string()]
    }

    fn list_page_kind(&self) -> ListPageKind {
        ListPageKind::Paginated
    }

    fn item_locator(&self) -> ItemLocator {
        ItemLocator {
            container: None,
            item: "div.depth-top-article-list".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        _now: NaiveDateTime,
    ) -> ParsedItem {
        let links = session.find_within(item, "a").unwrap_or_default();
        let headline = links.iter().find(|a| Self::is_headline(a.text()));

        // Fall back to the first long text line that is not a timestamp
        let title = match headline {
            Some(a) => Some(clean_title(a.text())),
            None => item
                .text()
                .lines()
                .map(str::trim)
                .find(|line| Self::is_headline(line) && !line.contains(HOURS_AGO))
                .map(clean_title),
        };

        ParsedItem {
            title,
            url: headline.and_then(link_target),
            source: Some("财联社".to_string()),
            time: None,
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, "div.f-l.w-894")
    }

    fn artifact_name(&self) -> &str {
        "cls_headline_news.json"
    }
}
