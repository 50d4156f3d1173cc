use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelUpError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no task matches id {0:?}")]
    TaskNotFound(String),

    #[error("id prefix {0:?} matches more than one task")]
    AmbiguousTaskId(String),

    #[error("task title must not be blank")]
    EmptyTitle,
}

pub type Result<T> = std::result::Result<T, LevelUpError>;
