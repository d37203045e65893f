use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the fetch/parse pipeline. All of these are handled at
/// the orchestration level only; no component recovers from its own errors.
#[derive(Debug, Error)]
pub enum PxError {
    /// A local query-definition file could not be read, or was not JSON.
    #[error("Query file not found: {}", path.display())]
    QueryFile { path: PathBuf },

    /// The statistics endpoint answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The response JSON lacks the expected dimension/value shape.
    #[error("PXWeb response format mismatch")]
    FormatMismatch,

    /// Transport-level failure (connect, TLS, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}
