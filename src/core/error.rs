//! Error types for the dashboard core

use thiserror::Error;

/// Errors raised by data queries.
///
/// Callers treat these as "nothing to draw yet" rather than failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataError {
    #[error("no samples received yet")]
    EmptyDataset,
}

/// Errors raised while decoding feed frames.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to parse feed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed payload has unexpected shape: {0}")]
    Shape(&'static str),
}
