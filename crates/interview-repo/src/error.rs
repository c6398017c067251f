use std::fmt;

pub type Result<T> = std::result::Result<T, RepoError>;

/// Error taxonomy for the persistence layer: hand-rolled `Display` +
/// `Error` + `From` impls, no `thiserror`.
#[derive(Debug)]
pub enum RepoError {
    Database(rusqlite::Error),
    Io(std::io::Error),
    NotFound(String),
    Serialization(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::Database(err) => write!(f, "database error: {err}"),
            RepoError::Io(err) => write!(f, "io error: {err}"),
            RepoError::NotFound(what) => write!(f, "not found: {what}"),
            RepoError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::Database(err) => Some(err),
            RepoError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(err: rusqlite::Error) -> Self {
        RepoError::Database(err)
    }
}

impl From<std::io::Error> for RepoError {
    fn from(err: std::io::Error) -> Self {
        RepoError::Io(err)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

impl From<RepoError> for interview_types::CoreError {
    fn from(err: RepoError) -> Self {
        interview_types::CoreError::Repository(err.to_string())
    }
}
