use thiserror::Error;

/// A failure that aborts the evaluation of a whole case.
///
/// Data-quality problems never end up here: they become findings. This type
/// is reserved for broken invariants inside the engine itself.
#[derive(Debug, Error)]
pub enum ExpertiseError {
    #[error("document worker for '{filename}' did not complete: {source}")]
    Worker {
        filename: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
