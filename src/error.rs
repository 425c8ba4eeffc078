use thiserror::Error;

#[derive(Debug, Error)]
pub enum MdbError {
    #[error(transparent)]
    Reconcile(#[from] crate::reconcile::ReconcileError),

    #[error(transparent)]
    State(#[from] crate::terraform::StateError),

    #[error(transparent)]
    Provider(#[from] crate::providers::ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
