use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::{NewsError, NewsResult};
use crate::render::{ElementHandle, RenderSession, SessionFactory};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Attributes a browser reports as absolute URLs
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

struct LoadedPage {
    url: Url,
    html: String,
}

/// Render session for pages that need no script execution.
///
/// Fetches the document over HTTP and answers queries from the parsed
/// markup. Waits settle immediately; clicks and scripts are unsupported.
pub struct StaticRenderSession {
    client: Client,
    page: Option<LoadedPage>,
}

impl StaticRenderSession {
    pub fn new(page_load_timeout: Duration) -> NewsResult<Self> {
        let client = Client::builder()
            .timeout(page_load_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, page: None })
    }

    fn page(&self) -> NewsResult<&LoadedPage> {
        self.page
            .as_ref()
            .ok_or_else(|| NewsError::Render("no page is open".to_string()))
    }
}

impl RenderSession for StaticRenderSession {
    fn open(&mut self, url: &str) -> NewsResult<()> {
        debug!(%url, "Fetching page");
        let response = self.client.get(url).send()?.error_for_status()?;
        let final_url = response.url().clone();
        let html = response.text()?;

        self.page = Some(LoadedPage {
            url: final_url,
            html,
        });
        Ok(())
    }

    fn wait_for_script_idle(&mut self, _timeout: Duration) -> NewsResult<bool> {
        self.page().map(|_| true)
    }

    fn wait_for_dom_ready(&mut self, _timeout: Duration) -> NewsResult<bool> {
        self.page().map(|_| true)
    }

    fn scroll_probe(&mut self) -> NewsResult<u64> {
        self.page().map(|page| page.html.len() as u64)
    }

    fn find(&self, selector: &str) -> NewsResult<Vec<ElementHandle>> {
        let page = self.page()?;
        let document = Html::parse_document(&page.html);
        select_handles(&document, &page.url, selector)
    }

    fn find_within(&self, scope: &ElementHandle, selector: &str) -> NewsResult<Vec<ElementHandle>> {
        let page = self.page()?;
        let fragment = Html::parse_fragment(scope.inner_html());
        select_handles(&fragment, &page.url, selector)
    }

    fn click(&mut self, _element: &ElementHandle) -> NewsResult<()> {
        Err(NewsError::Unsupported("click".to_string()))
    }

    fn execute_script(&mut self, _script: &str) -> NewsResult<Value> {
        Err(NewsError::Unsupported("execute_script".to_string()))
    }

    fn close(&mut self) -> NewsResult<()> {
        self.page = None;
        Ok(())
    }
}

pub struct StaticSessionFactory {
    page_load_timeout: Duration,
}

impl StaticSessionFactory {
    pub fn new(page_load_timeout: Duration) -> Self {
        Self { page_load_timeout }
    }
}

impl SessionFactory for StaticSessionFactory {
    fn create(&self) -> NewsResult<Box<dyn RenderSession>> {
        Ok(Box::new(StaticRenderSession::new(self.page_load_timeout)?))
    }
}

pub(crate) fn select_handles(document: &Html, base: &Url, selector: &str) -> NewsResult<Vec<ElementHandle>> {
    let selector =
        Selector::parse(selector).map_err(|e| NewsError::InvalidSelector(format!("{selector}: {e}")))?;

    Ok(document
        .select(&selector)
        .map(|element| to_handle(element, base))
        .collect())
}

fn to_handle(element: ElementRef<'_>, base: &Url) -> ElementHandle {
    let text = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let mut handle = ElementHandle::new(element.value().name())
        .with_text(text)
        .with_inner_html(element.inner_html());

    for (name, value) in element.value().attrs() {
        let value = if URL_ATTRIBUTES.contains(&name) {
            base.join(value)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        };
        handle = handle.with_attribute(name, value);
    }

    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"<html><body>
        <ul id="newsListContent">
          <li><p class="title"><a href="/a/1.html"> First  story </a></p><p class="time">2025年09月17日 11:30</p></li>
          <li><p class="title"><a href="https://other.example.com/2.html">Second</a></p></li>
        </ul>
    </body></html>"#;

    fn base() -> Url {
        Url::parse("https://finance.example.com/list/index.html").unwrap()
    }

    #[test]
    fn test_relative_href_resolved_against_page() {
        let document = Html::parse_document(LIST_PAGE);
        let links = select_handles(&document, &base(), "p.title a").unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attribute("href"), Some("https://finance.example.com/a/1.html"));
        assert_eq!(links[1].attribute("href"), Some("https://other.example.com/2.html"));
        assert_eq!(links[0].text(), "First  story");
    }

    #[test]
    fn test_find_within_scope_uses_inner_markup() {
        let document = Html::parse_document(LIST_PAGE);
        let items = select_handles(&document, &base(), "ul#newsListContent li").unwrap();
        assert_eq!(items.len(), 2);

        let fragment = Html::parse_fragment(items[0].inner_html());
        let times = select_handles(&fragment, &base(), "p.time").unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(times[0].text(), "2025年09月17日 11:30");

        let fragment = Html::parse_fragment(items[1].inner_html());
        assert!(select_handles(&fragment, &base(), "p.time").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let document = Html::parse_document(LIST_PAGE);
        let result = select_handles(&document, &base(), "p..title");
        assert!(matches!(result, Err(NewsError::InvalidSelector(_))));
    }

    #[test]
    fn test_queries_without_open_page_fail() {
        let mut session = StaticRenderSession::new(Duration::from_secs(1)).unwrap();
        assert!(session.find("li").is_err());
        assert!(session.scroll_probe().is_err());
        assert!(matches!(
            session.click(&ElementHandle::new("div")),
            Err(NewsError::Unsupported(_))
        ));
        assert!(session.close().is_ok());
    }
}
