use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("course not found: {0}")]
    CourseNotFound(usize),
    #[error("recommendations unavailable: {0:#}")]
    Unavailable(anyhow::Error),
    #[error("no profile fields to update")]
    EmptyUpdate,
}

impl From<anyhow::Error> for RecommendError {
    fn from(err: anyhow::Error) -> Self {
        RecommendError::Unavailable(err)
    }
}
