use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AssessmentError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AssessmentError {
    pub(crate) fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

pub(crate) type AssessmentResult<T> = Result<T, AssessmentError>;
