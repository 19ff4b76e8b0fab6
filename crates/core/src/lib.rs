#![forbid(unsafe_code)]

//! Domain model for the course catalog and playback progress.
//!
//! Everything here is storage- and UI-agnostic: validated entities,
//! percent-progress arithmetic, and the clock abstraction the service layer
//! injects for deterministic tests.

pub mod error;
pub mod model;
pub mod time;

pub use error::Error;
pub use model::{
    AuthUser, Course, CourseError, CourseId, Enrollment, MediaRef, MediaRefError, ParseIdError,
    PlaybackError, PlaybackRate, Progress, ProgressError, UserError, UserId, Volume,
};
pub use time::{Clock, FIXED_TEST_TIMESTAMP, fixed_clock, fixed_now};
