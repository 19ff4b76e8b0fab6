use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{CourseId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress percent must be between 0 and 100")]
    OutOfRange,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// How far through a course a user is, as an integer percent in `[0, 100]`.
///
/// All progress in the system is carried in this unit; fractional playback
/// positions are converted at the edge with [`Progress::from_fraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const COMPLETE: Progress = Progress(100);

    /// Creates a progress value from an integer percent.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::OutOfRange` above 100.
    pub fn new(percent: u8) -> Result<Self, ProgressError> {
        if percent > 100 {
            return Err(ProgressError::OutOfRange);
        }
        Ok(Self(percent))
    }

    /// Converts a playback fraction into a whole percent, flooring.
    ///
    /// Out-of-range and non-finite input is clamped rather than rejected:
    /// a fraction from a media element can briefly overshoot 1.0 or be NaN
    /// while metadata is missing, and neither should panic a progress sample.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        if !fraction.is_finite() || fraction <= 0.0 {
            return Self::ZERO;
        }
        if fraction >= 1.0 {
            return Self::COMPLETE;
        }
        // floor, not round: 99.9% watched is not complete
        Self((fraction * 100.0).floor() as u8)
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0 == 100
    }

    /// The saved position as a fraction of the full duration.
    #[must_use]
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── ENROLLMENT ────────────────────────────────────────────────────────────────
//

/// One user's membership in one course, with their saved progress.
///
/// There is at most one enrollment per `(user, course)` pair; the record
/// store enforces this. A fresh enrollment always starts at zero progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    user_id: UserId,
    course_id: CourseId,
    progress: Progress,
    enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    #[must_use]
    pub fn new(
        user_id: UserId,
        course_id: CourseId,
        progress: Progress,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            course_id,
            progress,
            enrolled_at,
        }
    }

    // Accessors
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
