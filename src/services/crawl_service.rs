use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{NewsRecord, ScrapeBatch, SourceTask};
use crate::errors::NewsResult;
use crate::render::{ElementHandle, RenderSession};
use crate::sources::{ItemLocator, ListPageKind, LoadMore, SourceAdapter};
use crate::storage::ArtifactStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub script_timeout: Duration,
    pub dom_timeout: Duration,
    /// Extra pause after the waits, for late XHR content
    pub settle_delay: Duration,
    pub scroll_probes: u32,
    pub scroll_pause: Duration,
    /// Treat every empty result as a failed attempt, not only structurally broken ones
    pub retry_on_empty: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            script_timeout: Duration::from_secs(10),
            dom_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(2),
            scroll_probes: 3,
            scroll_pause: Duration::from_secs(1),
            retry_on_empty: false,
        }
    }
}

impl PipelineSettings {
    /// Same waits, no sleeping
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            scroll_pause: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Records surviving the list phase of one attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub records: Vec<NewsRecord>,
    /// Some list page was missing its item container
    pub layout_broken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Written { path: PathBuf, count: usize },
    /// Nothing usable was found and no artifact was written
    Empty { layout_broken: bool },
}

/// Drives one source from its list pages to a written artifact
#[derive(Clone)]
pub struct CrawlPipeline {
    store: Arc<dyn ArtifactStore>,
    settings: PipelineSettings,
}

impl CrawlPipeline {
    pub fn new(store: Arc<dyn ArtifactStore>, settings: PipelineSettings) -> Self {
        Self { store, settings }
    }

    /// Run every stage for one attempt. Errors abort the attempt.
    pub fn run(&self, session: &mut dyn RenderSession, task: &SourceTask) -> NewsResult<CrawlOutcome> {
        let Collected {
            mut records,
            layout_broken,
        } = self.collect(session, task)?;

        if records.is_empty() && (layout_broken || self.settings.retry_on_empty) {
            warn!(source = %task.source_name, layout_broken, "No news collected");
            return Ok(CrawlOutcome::Empty { layout_broken });
        }

        self.fetch_content(session, task, &mut records);

        let count = records.len();
        let path = self.assemble(task.adapter.as_ref(), records)?;
        info!(source = %task.source_name, count, path = %path.display(), "Saved news batch");
        Ok(CrawlOutcome::Written { path, count })
    }

    /// Walk the list pages and return filtered, deduplicated records
    pub fn collect(&self, session: &mut dyn RenderSession, task: &SourceTask) -> NewsResult<Collected> {
        let adapter = task.adapter.as_ref();
        let source = task.source_name.as_str();
        let locator = adapter.item_locator();
        let kind = adapter.list_page_kind();
        let now = Local::now().naive_local();

        let mut drafts = Vec::new();
        let mut layout_broken = false;

        for (index, url) in adapter.list_page_urls().iter().enumerate() {
            info!(source, page = index + 1, %url, "Loading list page");
            session.open(url)?;
            self.settle(session, source);
            self.scroll(session, source);

            if let ListPageKind::IncrementalLoad(load_more) = &kind {
                self.reveal_more(session, source, load_more, &locator);
            }

            let items = match extract_items(&*session, &locator)? {
                Some(items) => items,
                None => {
                    warn!(source, %url, "List container not found, page layout may have changed");
                    layout_broken = true;
                    Vec::new()
                }
            };

            if items.is_empty() {
                info!(source, page = index + 1, "No items on list page, stopping");
                break;
            }

            debug!(source, page = index + 1, count = items.len(), "Extracted list items");
            for item in &items {
                match adapter.parse_item(&*session, item, now).into_record() {
                    Some(record) => drafts.push(record),
                    None => debug!(source, tag = item.tag(), "Skipping item without title, url or source"),
                }
            }
        }

        let records = filter_and_dedup(drafts, task.time_cutoff);
        info!(source, count = records.len(), "Collected news after filtering");
        Ok(Collected {
            records,
            layout_broken,
        })
    }

    /// Open each record's page and attach its body. Failures leave `content` empty.
    pub fn fetch_content(&self, session: &mut dyn RenderSession, task: &SourceTask, records: &mut [NewsRecord]) {
        let source = task.source_name.as_str();
        let total = records.len();

        for (index, record) in records.iter_mut().enumerate() {
            debug!(source, progress = index + 1, total, url = %record.url, "Fetching content");
            if let Err(e) = session.open(&record.url) {
                warn!(source, url = %record.url, error = %e, "Failed to open article");
                continue;
            }
            self.settle(session, source);

            record.content = task.adapter.parse_content(&*session);
            if record.content.is_none() {
                warn!(source, url = %record.url, "No article content found");
            }
        }
    }

    pub fn assemble(&self, adapter: &dyn SourceAdapter, records: Vec<NewsRecord>) -> NewsResult<PathBuf> {
        let batch = ScrapeBatch::new(records, Local::now().naive_local());
        self.store.write_batch(adapter.artifact_name(), &batch)
    }

    fn settle(&self, session: &mut dyn RenderSession, source: &str) {
        match session.wait_for_script_idle(self.settings.script_timeout) {
            Ok(true) => {}
            Ok(false) => debug!(source, "Timed out waiting for scripts to settle"),
            Err(e) => debug!(source, error = %e, "Script idle wait failed"),
        }
        match session.wait_for_dom_ready(self.settings.dom_timeout) {
            Ok(true) => {}
            Ok(false) => debug!(source, "Timed out waiting for document ready"),
            Err(e) => debug!(source, error = %e, "Document ready wait failed"),
        }
        pause(self.settings.settle_delay);
    }

    /// Scroll until the document stops growing or the probe budget runs out
    fn scroll(&self, session: &mut dyn RenderSession, source: &str) {
        let mut last_height = None;

        for probe in 1..=self.settings.scroll_probes {
            match session.scroll_probe() {
                Ok(height) => {
                    if last_height.is_some_and(|last| height <= last) {
                        debug!(source, probe, height, "Page stopped growing");
                        break;
                    }
                    last_height = Some(height);
                    pause(self.settings.scroll_pause);
                }
                Err(e) => {
                    warn!(source, probe, error = %e, "Scroll failed");
                    break;
                }
            }
        }
    }

    fn reveal_more(
        &self,
        session: &mut dyn RenderSession,
        source: &str,
        load_more: &LoadMore,
        locator: &ItemLocator,
    ) {
        let mut count = count_items(&*session, locator);

        for click in 1..=load_more.max_clicks {
            self.scroll(session, source);

            let Some(button) = find_load_more(&*session, load_more) else {
                debug!(source, click, "Load more button not found");
                break;
            };
            if let Err(e) = session.click(&button) {
                debug!(source, click, error = %e, "Load more click failed");
                break;
            }
            self.settle(session, source);

            let grown = count_items(&*session, locator);
            if grown <= count {
                debug!(source, click, count, "Load more revealed nothing new");
                break;
            }
            info!(source, click, before = count, after = grown, "Loaded more items");
            count = grown;
        }
    }
}

/// Drop records at or before `cutoff` and keep the first record per title.
/// Records without a time always pass the cutoff.
pub fn filter_and_dedup(records: Vec<NewsRecord>, cutoff: NaiveDateTime) -> Vec<NewsRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| record.is_after(cutoff))
        .filter(|record| seen.insert(record.title.clone()))
        .collect()
}

/// `None` when the container selector matched nothing
fn extract_items(session: &dyn RenderSession, locator: &ItemLocator) -> NewsResult<Option<Vec<ElementHandle>>> {
    let Some(container) = &locator.container else {
        return session.find(&locator.item).map(Some);
    };

    let containers = session.find(container)?;
    if containers.is_empty() {
        return Ok(None);
    }

    let mut items = Vec::new();
    for scope in &containers {
        items.extend(session.find_within(scope, &locator.item)?);
    }
    Ok(Some(items))
}

fn count_items(session: &dyn RenderSession, locator: &ItemLocator) -> usize {
    match extract_items(session, locator) {
        Ok(Some(items)) => items.len(),
        _ => 0,
    }
}

fn find_load_more(session: &dyn RenderSession, load_more: &LoadMore) -> Option<ElementHandle> {
    session
        .find(&load_more.selector)
        .ok()?
        .into_iter()
        .find(|candidate| {
            load_more
                .label
                .as_deref()
                .map_or(true, |label| candidate.text().contains(label))
        })
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
