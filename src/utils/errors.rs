use thiserror::Error;

use crate::api::QuoteError;
use crate::services::series_service::SeriesError;
use crate::storage::StorageError;

/// Fatal failures that end a run without persisting
#[derive(Debug, Error)]
pub enum RunError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cached series is malformed: {0}")]
    Series(#[from] SeriesError),

    #[error("quote fetch failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
