use thiserror::Error;

/// Errors that can occur while loading, indexing, or searching part records.
#[derive(Error, Debug)]
pub enum XrefError {
    #[error("database error: {message} (operation: {operation})")]
    Database { message: String, operation: String },

    #[error("record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl XrefError {
    /// Returns `true` for failures that originate in the record store
    /// rather than in the caller's input or configuration.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            XrefError::Database { .. } | XrefError::StoreUnavailable { .. } | XrefError::Sqlite(_)
        )
    }
}

/// Convenience alias for results using `XrefError`.
pub type Result<T> = std::result::Result<T, XrefError>;
