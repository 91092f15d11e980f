pub mod artifact;
pub mod sqlite;
pub mod traits;

pub use artifact::{read_batch, write_json_atomic, JsonArtifactStore};
pub use sqlite::{parse_time_bound, SqliteNewsRepository, SqliteStorage};
pub use traits::{ArtifactStore, NewsRepository};

#[cfg(test)]
pub use traits::{MockArtifactStore, MockNewsRepository};
