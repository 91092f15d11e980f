use std::collections::{HashMap, HashSet};
use std::time::Duration;

use scraper::Html;
use serde_json::Value;
use url::Url;

use crate::errors::{NewsError, NewsResult};
use crate::render::static_page::select_handles;
use crate::render::{ElementHandle, RenderSession};

/// In-memory session serving canned markup per URL.
///
/// Each URL holds one or more markup stages; a click advances to the next
/// stage, which is how tests simulate "load more".
#[derive(Default)]
pub(crate) struct FixtureSession {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    current: Option<(String, usize)>,
    pub(crate) opened: Vec<String>,
    pub(crate) clicks: usize,
}

impl FixtureSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), vec![html.to_string()]);
        self
    }

    pub(crate) fn with_stages(mut self, url: &str, stages: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), stages.iter().map(|s| s.to_string()).collect());
        self
    }

    pub(crate) fn with_failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn current_html(&self) -> NewsResult<(&str, &str)> {
        let (url, stage) = self
            .current
            .as_ref()
            .ok_or_else(|| NewsError::Render("no page is open".to_string()))?;
        let html = &self.pages[url][*stage];
        Ok((url.as_str(), html.as_str()))
    }

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap_or_else(|_| Url::parse("http://fixture.local/").unwrap())
    }
}

impl RenderSession for FixtureSession {
    fn open(&mut self, url: &str) -> NewsResult<()> {
        self.opened.push(url.to_string());
        if self.failing.contains(url) || !self.pages.contains_key(url) {
            self.current = None;
            return Err(NewsError::Render(format!("cannot load {url}")));
        }
        self.current = Some((url.to_string(), 0));
        Ok(())
    }

    fn wait_for_script_idle(&mut self, _timeout: Duration) -> NewsResult<bool> {
        Ok(true)
    }

    fn wait_for_dom_ready(&mut self, _timeout: Duration) -> NewsResult<bool> {
        Ok(true)
    }

    fn scroll_probe(&mut self) -> NewsResult<u64> {
        self.current_html().map(|(_, html)| html.len() as u64)
    }

    fn find(&self, selector: &str) -> NewsResult<Vec<ElementHandle>> {
        let (url, html) = self.current_html()?;
        select_handles(&Html::parse_document(html), &Self::base(url), selector)
    }

    fn find_within(&self, scope: &ElementHandle, selector: &str) -> NewsResult<Vec<ElementHandle>> {
        let (url, _) = self.current_html()?;
        select_handles(&Html::parse_fragment(scope.inner_html()), &Self::base(url), selector)
    }

    fn click(&mut self, _element: &ElementHandle) -> NewsResult<()> {
        self.clicks += 1;
        if let Some((url, stage)) = self.current.as_mut() {
            if *stage + 1 < self.pages[url.as_str()].len() {
                *stage += 1;
            }
        }
        Ok(())
    }

    fn execute_script(&mut self, _script: &str) -> NewsResult<Value> {
        Ok(Value::Null)
    }

    fn close(&mut self) -> NewsResult<()> {
        self.current = None;
        Ok(())
    }
}
