use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::CourseId;
use crate::model::media::MediaRef;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course rating must be between 0 and 5")]
    InvalidRating,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A published course: one video lesson plus its catalog card fields.
///
/// Courses are authored by an external admin tool; this app only reads them
/// and records per-user enrollment against their ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    instructor: Option<String>,
    thumbnail: Option<MediaRef>,
    video: MediaRef,
    rating: f32,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new Course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is empty or
    /// whitespace-only, `CourseError::InvalidRating` if the rating is not a
    /// finite value in `[0, 5]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        instructor: Option<String>,
        thumbnail: Option<MediaRef>,
        video: MediaRef,
        rating: f32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(CourseError::InvalidRating);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        let instructor = instructor
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description,
            instructor,
            thumbnail,
            video,
            rating,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn instructor(&self) -> Option<&str> {
        self.instructor.as_deref()
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&MediaRef> {
        self.thumbnail.as_ref()
    }

    #[must_use]
    pub fn video(&self) -> &MediaRef {
        &self.video
    }

    #[must_use]
    pub fn rating(&self) -> f32 {
        self.rating
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
