use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the coaching service.
///
/// Every public service operation converts these into a uniform result shape
/// at the boundary; nothing here is fatal to the process, and a failed
/// operation never corrupts the session store.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("service has not been initialized")]
    NotInitialized,
    #[error("session '{0}' not found or no longer active")]
    SessionNotFound(Uuid),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    /// Wraps any failure from an injected capability (persistence, alerts,
    /// model backends).
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}
