use thiserror::Error;

use crate::model::{CourseError, MediaRefError, PlaybackError, ProgressError, UserError};

/// Aggregate error for callers that cross several model types at once.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    MediaRef(#[from] MediaRefError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    User(#[from] UserError),
}
