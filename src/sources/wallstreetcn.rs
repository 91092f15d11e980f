use chrono::NaiveDateTime;

use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{clean_title, first_within, link_target, page_text, parse_iso};
use crate::sources::traits::{ItemLocator, ListPageKind, LoadMore, ParsedItem, SourceAdapter};

/// WallStreetCN global news feed
pub struct WallStreetCnSource;

impl WallStreetCnSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WallStreetCnSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for WallStreetCnSource {
    fn name(&self) -> &str {
        "华尔街见闻"
    }

    fn aliases(&self) -> Vec<&str> {
        vec!["wallstreetcn", "wscn"]
    }

    fn list_page_urls(&self) -> Vec<String> {
        vec!["https://wallstreetcn.com/news/global".to_string()]
    }

    fn list_page_kind(&self) -> ListPageKind {
        ListPageKind::IncrementalLoad(LoadMore {
            selector: ".load-more".to_string(),
            label: None,
            max_clicks: 5,
        })
    }

    fn item_locator(&self) -> ItemLocator {
        ItemLocator {
            container: Some("div.article-list".to_string()),
            item: "div.article-entry.list-item".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        _now: NaiveDateTime,
    ) -> ParsedItem {
        let link = first_within(session, item, "a");
        let title = link
            .as_ref()
            .and_then(|a| first_within(session, a, "span"))
            .map(|span| clean_title(span.text()));

        let time = first_within(session, item, ".time")
            .and_then(|t| t.attribute("datetime").and_then(parse_iso));

        ParsedItem {
            title,
            url: link.as_ref().and_then(link_target),
            source: Some(self.name().to_string()),
            time,
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, ".article")
    }

    fn artifact_name(&self) -> &str {
        "wallstreetcn_news.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixture::FixtureSession;
    use chrono::NaiveDate;

    const LIST: &str = r#"<div class="article-list">
        <div class="article-entry list-item">
          <a href="/articles/3750001"><span>美联储 维持利率不变</span></a>
          <time class="time" datetime="2025-09-21T10:15:00+08:00">10:15</time>
        </div>
    </div>"#;

    #[test]
    fn test_parse_item() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 21).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let source = WallStreetCnSource::new();
        let url = "https://wallstreetcn.com/news/global";
        let mut session = FixtureSession::new().with_page(url, LIST);
        session.open(url).unwrap();

        let items = session.find("div.article-entry.list-item").unwrap();
        let parsed = source.parse_item(&session, &items[0], now);
        assert_eq!(parsed.title.as_deref(), Some("美联储 维持利率不变"));
        assert_eq!(parsed.url.as_deref(), Some("https://wallstreetcn.com/articles/3750001"));
        assert_eq!(parsed.time.unwrap().to_string(), "2025-09-21 10:15:00");
    }
}
