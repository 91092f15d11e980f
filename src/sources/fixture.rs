use chrono::NaiveDateTime;

use crate::domain::TIME_FORMAT;
use crate::render::{ElementHandle, RenderSession};
use crate::sources::parsing::{clean_title, first_within, link_target, page_text};
use crate::sources::traits::{ItemLocator, ListPageKind, ParsedItem, SourceAdapter};

/// Adapter over plain `<ul class="news"><li data-time=..><a>..</a></li></ul>` markup.
///
/// Article pages carry their body in `div.body`.
pub(crate) struct FixtureAdapter {
    name: String,
    artifact: String,
    urls: Vec<String>,
    kind: ListPageKind,
    container: Option<String>,
    panics: bool,
}

impl FixtureAdapter {
    pub(crate) fn new(name: &str, urls: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            artifact: format!("{name}_news.json"),
            urls: urls.iter().map(|u| u.to_string()).collect(),
            kind: ListPageKind::Paginated,
            container: Some("ul.news".to_string()),
            panics: false,
        }
    }

    pub(crate) fn with_kind(mut self, kind: ListPageKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn without_container(mut self) -> Self {
        self.container = None;
        self
    }

    /// Panic as soon as the pipeline asks for list pages
    pub(crate) fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }
}

impl SourceAdapter for FixtureAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_page_urls(&self) -> Vec<String> {
        if self.panics {
            panic!("fixture adapter {} exploded", self.name);
        }
        self.urls.clone()
    }

    fn list_page_kind(&self) -> ListPageKind {
        self.kind.clone()
    }

    fn item_locator(&self) -> ItemLocator {
        ItemLocator {
            container: self.container.clone(),
            item: "li".to_string(),
        }
    }

    fn parse_item(
        &self,
        session: &dyn RenderSession,
        item: &ElementHandle,
        _now: NaiveDateTime,
    ) -> ParsedItem {
        let link = first_within(session, item, "a");

        ParsedItem {
            title: link.as_ref().map(|a| clean_title(a.text())),
            url: link.as_ref().and_then(link_target),
            source: Some(self.name.clone()),
            time: item
                .attribute("data-time")
                .and_then(|t| NaiveDateTime::parse_from_str(t, TIME_FORMAT).ok()),
        }
    }

    fn parse_content(&self, session: &dyn RenderSession) -> Option<String> {
        page_text(session, "div.body")
    }

    fn artifact_name(&self) -> &str {
        &self.artifact
    }
}
