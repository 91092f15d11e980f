pub mod archive_service;
pub mod crawl_service;
pub mod merge_service;
pub mod orchestrator;
pub mod retry_service;

pub use archive_service::{ArchiveService, ArchiveStats, ImportResult, NewsQuery};
pub use crawl_service::{filter_and_dedup, Collected, CrawlOutcome, CrawlPipeline, PipelineSettings};
pub use merge_service::{MergeReport, MergeService, MERGED_ARTIFACT};
pub use orchestrator::{Orchestrator, RunConfig};
pub use retry_service::{Backoff, RetryController, Sleeper};
