use chrono::NaiveDateTime;

use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{clean_title, first_within, link_target, page_text, parse_relative};
use crate::sources::traits::{ItemLocator, ListPageKind, LoadMore, ParsedItem, SourceAdapter};

/// CLS in-depth column, one page grown through its "加载更多" button
pub struct ClsSource;

impl ClsSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ClsSource {
    fn name(&self) -> &str {
        "财联社"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["cls"]
    }

    fn list_page_urls(&self) -> Vec<String> {
        vec!["https://www.cls.cn/depth?id=1000".to_string()]
    }

    fn list_page_kind(&self) -> ListPageKind {
        ListPageKind::IncrementalLoad(LoadMore {
            selector: "div.more-button".to_string(),
            label: Some("加载更多".to_string()),
            max_clicks: 5,
        })
    }

    fn item_locator(&self) -> ItemLocator {
        ItemLocator {
            container: Some("div.depth-list-box".to_string()),
            item: "div.subject-interest-image-content-box.p-r".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        now: NaiveDateTime,
    ) -> ParsedItem {
        let link = first_within(session, item, "div.subject-interest-title a");

        ParsedItem {
            title: link.as_ref().map(|a| clean_title(a.text())),
            url: link.as_ref().and_then(link_target),
            source: Some(self.name().to_string()),
            time: first_within(session, item, "span.m-r-5").and_then(|s| parse_relative(s.text(), now)),
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, "div.f-l.w-894")
    }

    fn artifact_name(&self) -> &str {
        "cls_news.json"
    }
}
