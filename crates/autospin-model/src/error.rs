use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid model id {0:?}: expected non-empty [A-Za-z0-9._-]")]
    InvalidModelId(String),
    #[error("invalid time limit {0:?}")]
    InvalidWallTime(String),
    #[error("job name {0:?} is not owned by autospin")]
    NotOwned(String),
}
