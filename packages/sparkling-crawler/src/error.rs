use thiserror::Error;

/// Failures surfaced by page fetch/advance implementations.
///
/// The run loop needs to tell the two apart: an unavailable page fails one
/// listing, an unreachable fetcher aborts the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page fetcher unreachable: {0}")]
    Unreachable(String),
    #[error("page unavailable: {0}")]
    PageUnavailable(String),
}
