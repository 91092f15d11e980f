use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Unknown news source: {0}")]
    UnknownSource(String),

    #[error("No work to perform: {0}")]
    NoWork(String),

    // Render session errors
    #[error("Render session failed: {0}")]
    Render(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unsupported by this render session: {0}")]
    Unsupported(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Nothing to merge in {0}")]
    NothingToMerge(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tempfile::PersistError> for NewsError {
    fn from(err: tempfile::PersistError) -> Self {
        NewsError::Io(err.error)
    }
}

pub type NewsResult<T> = Result<T, NewsError>;
