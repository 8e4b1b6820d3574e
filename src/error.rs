use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("The HTML content should contain 'id={0}', but it cannot be found")]
    TableNotFound(&'static str),

    #[error("Expected exactly one table, got {0}")]
    AmbiguousTable(usize),

    #[error("Table header should have two levels, got {levels}")]
    NotMultiLevel { levels: usize },

    #[error("Table header must be flattened before renaming")]
    HeaderNotFlat,

    #[error("Column count mismatch: table has {actual}, expected {expected}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("Schema drift at {stage}: expected {expected:?}, got {actual:?}")]
    SchemaDrift {
        stage: &'static str,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
