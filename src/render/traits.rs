use std::time::Duration;

use serde_json::Value;

use crate::errors::NewsResult;
use crate::render::ElementHandle;

/// A controllable page viewer. Every call blocks until the engine answers.
///
/// Selectors are CSS selectors. Waits return `Ok(false)` when the timeout
/// elapsed before the condition held; that is not an error.
#[cfg_attr(test, mockall::automock)]
pub trait RenderSession {
    fn open(&mut self, url: &str) -> NewsResult<()>;

    fn wait_for_script_idle(&mut self, timeout: Duration) -> NewsResult<bool>;

    fn wait_for_dom_ready(&mut self, timeout: Duration) -> NewsResult<bool>;

    /// Scroll to the bottom of the document and report its height afterwards
    fn scroll_probe(&mut self) -> NewsResult<u64>;

    fn find(&self, selector: &str) -> NewsResult<Vec<ElementHandle>>;

    fn find_within(&self, scope: &ElementHandle, selector: &str) -> NewsResult<Vec<ElementHandle>>;

    fn click(&mut self, element: &ElementHandle) -> NewsResult<()>;

    fn execute_script(&mut self, script: &str) -> NewsResult<Value>;

    fn close(&mut self) -> NewsResult<()>;
}

/// Creates one fresh session per crawl attempt.
#[cfg_attr(test, mockall::automock)]
pub trait SessionFactory: Send + Sync {
    fn create(&self) -> NewsResult<Box<dyn RenderSession>>;
}
