use chrono::NaiveDateTime;

use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{
    clean_title, contains_month_day, first_within, link_target, page_text, parse_cn_month_day,
};
use crate::sources::traits::{ItemLocator, ListPageKind, ParsedItem, SourceAdapter};

const LIST_PAGE_TEMPLATE: &str = "https://news.10jqka.com.cn/today_list/index_{}.shtml";
const LIST_PAGES: usize = 5;

/// 10jqka "today" list, five numbered pages
pub struct JqkaSource;

impl JqkaSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JqkaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for JqkaSource {
    fn name(&self) -> &str {
        "同花顺"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["jqka", "10jqka"]
    }

    fn list_page_urls(&self) -> Vec<String> {
        (1..=LIST_PAGES)
            .map(|page| LIST_PAGE_TEMPLATE.replace("{}", &page.to_string()))
            .collect()
    }

    fn list_page_kind(&self) -> ListPageKind {
        ListPageKind::Paginated
    }

    fn item_locator(&self) -> ItemLocator {
        ItemLocator {
            container: Some("div.list-con".to_string()),
            item: "li".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        now: NaiveDateTime,
    ) -> ParsedItem {
        let Some(arc_title) = first_within(session, item, "span.arc-title") else {
            return ParsedItem::default();
        };
        let link = first_within(session, &arc_title, "a");

        // The timestamp sits in one of the nested spans
        let time = session
            .find_within(&arc_title, "span")
            .unwrap_or_default()
            .iter()
            .find(|span| contains_month_day(span.text()))
            .and_then(|span| parse_cn_month_day(span.text(), now));

        ParsedItem {
            title: link.as_ref().map(|a| clean_title(a.text())),
            url: link.as_ref().and_then(link_target),
            source: Some(self.name().to_string()),
            time,
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, "#contentApp")
    }

    fn artifact_name(&self) -> &str {
        "jqka_news.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixture::FixtureSession;
    use chrono::NaiveDate;

    const LIST: &str = r#"<div class="list-con"><ul>
        <li><span class="arc-title"><a href="http://news.10jqka.com.cn/20250921/c1.shtml">沪指 震荡 走高</a>
            <span>09月21日 11:27</span></span></li>
        <li><span class="other">no title here</span></li>
    </ul></div>"#;

    #[test]
    fn test_parse_item() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 21).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let source = JqkaSource::new();
        let url = "https://news.10jqka.com.cn/today_list/index_1.shtml";
        let mut session = FixtureSession::new().with_page(url, LIST);
        session.open(url).unwrap();

        let items = session.find("div.list-con li").unwrap();
        let first = source.parse_item(&session, &items[0], now);
        assert_eq!(first.title.as_deref(), Some("沪指 震荡 走高"));
        assert_eq!(first.time.unwrap().to_string(), "2025-09-21 11:27:00");

        let second = source.parse_item(&session, &items[1], now);
        assert_eq!(second, ParsedItem::default());
    }
}
