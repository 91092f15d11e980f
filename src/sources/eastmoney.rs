use chrono::NaiveDateTime;

use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{clean_title, first_within, link_target, page_text, parse_cn_datetime};
use crate::sources::traits::{ItemLocator, ListPageKind, ParsedItem, SourceAdapter};

const LIST_PAGE_TEMPLATE: &str = "https://finance.eastmoney.com/a/cywjh_{}.html";
const LIST_PAGES: usize = 5;

/// EastMoney finance headlines, five numbered list pages
pub struct EastMoneySource;

impl EastMoneySource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EastMoneySource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for EastMoneySource {
    fn name(&self) -> &str {
        "东方财富网"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["eastmoney"]
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
            container: Some("ul#newsListContent".to_string()),
            item: "li".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        _now: NaiveDateTime,
    ) -> ParsedItem {
        let link = first_within(session, item, "p.title a");

        ParsedItem {
            title: link.as_ref().map(|a| clean_title(a.text())),
            url: link.as_ref().and_then(link_target),
            source: Some(self.name().to_string()),
            time: first_within(session, item, "p.time").and_then(|p| parse_cn_datetime(p.text())),
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, "#ContentBody")
    }

    fn artifact_name(&self) -> &str {
        "eastmoney_news.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixture::FixtureSession;
    use chrono::NaiveDate;

    const LIST: &str = r#"<ul id="newsListContent">
        <li><p class="title"><a href="https://finance.eastmoney.com/a/1.html">
            央行 开展 逆回购操作</a></p><p class="time">2025年09月17日 11:30</p></li>
        <li><p class="title"><a href="https://finance.eastmoney.com/a/2.html">无时间</a></p></li>
    </ul>"#;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 17).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_list_pages() {
        let urls = EastMoneySource::new().list_page_urls();
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://finance.eastmoney.com/a/cywjh_1.html");
        assert_eq!(urls[4], "https://finance.eastmoney.com/a/cywjh_5.html");
    }

    #[test]
    fn test_parse_item() {
        let source = EastMoneySource::new();
        let mut session = FixtureSession::new().with_page("https://finance.eastmoney.com/a/cywjh_1.html", LIST);
        session.open("https://finance.eastmoney.com/a/cywjh_1.html").unwrap();

        let items = session.find("ul#newsListContent li").unwrap();
        let first = source.parse_item(&session, &items[0], now());
        assert_eq!(first.title.as_deref(), Some("央行 开展 逆回购操作"));
        assert_eq!(first.url.as_deref(), Some("https://finance.eastmoney.com/a/1.html"));
        assert_eq!(first.source.as_deref(), Some("东方财富网"));
        assert_eq!(first.time.unwrap().to_string(), "2025-09-17 11:30:00");

        let second = source.parse_item(&session, &items[1], now());
        assert!(second.time.is_none());
        assert!(second.into_record().is_some());
    }
}
