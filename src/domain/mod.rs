pub mod record;
pub mod batch;
pub mod task;

pub use batch::ScrapeBatch;
pub use record::{NewsRecord, TIME_FORMAT};
pub use task::{RunSummary, SourceTask};
