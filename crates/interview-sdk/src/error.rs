use std::fmt;

/// The facade's own error type. Wraps [`interview_types::CoreError`] rather
/// than re-exporting it directly, so callers of this crate don't need to
/// reach into `interview-types` just to match on an error, and so the
/// facade can surface lookup failures (`NotFound`) that have no core
/// taxonomy variant of their own.
#[derive(Debug)]
pub enum Error {
    Core(interview_types::CoreError),
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Core(err) => write!(f, "{err}"),
            Error::NotFound(what) => write!(f, "not found: {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Core(err) => Some(err),
            Error::NotFound(_) => None,
        }
    }
}

impl From<interview_types::CoreError> for Error {
    fn from(err: interview_types::CoreError) -> Self {
        Error::Core(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
