mod course;
mod enrollment;
mod ids;
mod media;
mod playback;
mod user;

pub use course::{Course, CourseError};
pub use enrollment::{Enrollment, Progress, ProgressError};
pub use ids::{CourseId, ParseIdError, UserId};
pub use media::{MediaRef, MediaRefError};
pub use playback::{PlaybackError, PlaybackRate, Volume};
pub use user::{AuthUser, UserError};
