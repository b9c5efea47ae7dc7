use thiserror::Error;

/// Errors surfaced by the store and its persistence collaborator.
///
/// Reference errors (unknown tab/bookmark/quick-link ids) are deliberately
/// not represented here: those are handled as safe no-ops.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quick link limit of {0} reached")]
    QuickLinkLimit(usize),

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
