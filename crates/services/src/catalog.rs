//! The shared course catalog and enrollment state.
//!
//! One `EnrollmentCatalog` is created at startup and handed to every
//! view. It caches which courses the current user is enrolled in so the
//! browse views can label cards without a round trip, and it exposes
//! `invalidate`/`refresh` so the cache never has to be guessed stale.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use academy_core::model::{AuthUser, Course, CourseId, Enrollment, Progress, UserId};
use academy_core::time::Clock;
use storage::repository::{
    CourseRepository, DashboardRow, EnrollmentRepository, StorageError,
};

use crate::auth::SessionService;
use crate::error::CatalogError;

/// How many courses the home screen features.
pub const FEATURED_LIMIT: u32 = 5;

/// Aggregate numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentStats {
    pub enrolled: usize,
    pub completed: usize,
    /// Mean saved progress across enrollments, floored to a whole percent.
    pub average: Progress,
}

impl EnrollmentStats {
    fn from_rows(rows: &[DashboardRow]) -> Self {
        let enrolled = rows.len();
        let completed = rows.iter().filter(|r| r.progress.is_complete()).count();
        let average = if rows.is_empty() {
            Progress::ZERO
        } else {
            let total: u32 = rows.iter().map(|r| u32::from(r.progress.value())).sum();
            // The mean of values in 0..=100 fits u8.
            #[allow(clippy::cast_possible_truncation)]
            let mean = (total / enrolled as u32) as u8;
            Progress::new(mean).unwrap_or(Progress::COMPLETE)
        };
        Self {
            enrolled,
            completed,
            average,
        }
    }
}

/// Everything the dashboard renders: rows ordered by progress descending
/// plus the stats strip.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub rows: Vec<DashboardRow>,
    pub stats: EnrollmentStats,
}

struct EnrolledCache {
    user: UserId,
    ids: HashSet<CourseId>,
}

/// Courses plus the current user's enrollments, with a per-user cache of
/// enrolled course ids.
pub struct EnrollmentCatalog {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    session: Arc<SessionService>,
    cache: RwLock<Option<EnrolledCache>>,
}

impl EnrollmentCatalog {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        session: Arc<SessionService>,
    ) -> Self {
        Self {
            clock,
            courses,
            enrollments,
            session,
            cache: RwLock::new(None),
        }
    }

    /// Published courses, newest first. `None` means all of them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` when the store cannot be read. An
    /// empty catalog is `Ok(vec![])`, not an error.
    pub async fn load_courses(&self, limit: Option<u32>) -> Result<Vec<Course>, CatalogError> {
        Ok(self.courses.list_courses(limit).await?)
    }

    /// The newest few courses for the home screen.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` when the store cannot be read.
    pub async fn featured_courses(&self) -> Result<Vec<Course>, CatalogError> {
        self.load_courses(Some(FEATURED_LIMIT)).await
    }

    /// One course by id; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` when the store cannot be read.
    pub async fn course(&self, id: CourseId) -> Result<Option<Course>, CatalogError> {
        Ok(self.courses.get_course(id).await?)
    }

    /// The set of course ids the signed-in user is enrolled in, cached
    /// per user until `invalidate` or a user change.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AuthRequired` when nobody is signed in and
    /// `CatalogError::Storage` when the store cannot be read.
    pub async fn enrolled_ids(&self) -> Result<HashSet<CourseId>, CatalogError> {
        let user = self.require_user()?;
        if let Some(ids) = self.cached_for(user.id()) {
            return Ok(ids);
        }
        let ids: HashSet<CourseId> = self
            .enrollments
            .enrolled_course_ids(user.id())
            .await?
            .into_iter()
            .collect();
        self.store_cache(user.id(), ids.clone());
        Ok(ids)
    }

    /// Enrolls the signed-in user in `course_id`.
    ///
    /// Enrolling is idempotent: if the user is already enrolled the
    /// existing record comes back untouched, including when a concurrent
    /// writer wins the insert race.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AuthRequired` when nobody is signed in and
    /// `CatalogError::Storage` when the store rejects the write.
    pub async fn enroll(&self, course_id: CourseId) -> Result<Enrollment, CatalogError> {
        let user = self.require_user()?;
        let enrolled = self.enrolled_ids().await?;
        if enrolled.contains(&course_id) {
            if let Some(existing) = self
                .enrollments
                .find_enrollment(user.id(), course_id)
                .await?
            {
                return Ok(existing);
            }
            // Cache said enrolled but the store disagrees; insert fresh.
        }

        match self
            .enrollments
            .insert_enrollment(user.id(), course_id, self.clock.now())
            .await
        {
            Ok(enrollment) => {
                self.cache_insert(user.id(), course_id);
                Ok(enrollment)
            }
            Err(StorageError::Conflict) => {
                // Lost the insert race; the stored row wins.
                let existing = self
                    .enrollments
                    .find_enrollment(user.id(), course_id)
                    .await?
                    .ok_or(StorageError::Conflict)?;
                self.cache_insert(user.id(), course_id);
                Ok(existing)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The dashboard for the signed-in user: enrollments joined with
    /// their courses, most-watched first, plus the stats strip.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AuthRequired` when nobody is signed in and
    /// `CatalogError::Storage` when the join cannot be read.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot, CatalogError> {
        let user = self.require_user()?;
        let mut rows = self.enrollments.dashboard_rows(user.id()).await?;
        rows.sort_by(|a, b| {
            b.progress
                .cmp(&a.progress)
                .then(a.course_id.cmp(&b.course_id))
        });
        let stats = EnrollmentStats::from_rows(&rows);
        Ok(DashboardSnapshot { rows, stats })
    }

    /// Saved progress for the signed-in user in one course, `Ok(None)`
    /// when not enrolled.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AuthRequired` when nobody is signed in and
    /// `CatalogError::Storage` when the store cannot be read.
    pub async fn saved_progress(&self, course_id: CourseId) -> Result<Option<Progress>, CatalogError> {
        let user = self.require_user()?;
        let enrollment = self
            .enrollments
            .find_enrollment(user.id(), course_id)
            .await?;
        Ok(enrollment.map(|e| e.progress()))
    }

    /// Drops the cached enrollment set. The next read reloads it.
    pub fn invalidate(&self) {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Drops the cache and reloads the enrollment set in one step.
    ///
    /// # Errors
    ///
    /// Same as [`EnrollmentCatalog::enrolled_ids`].
    pub async fn refresh(&self) -> Result<HashSet<CourseId>, CatalogError> {
        self.invalidate();
        self.enrolled_ids().await
    }

    fn require_user(&self) -> Result<AuthUser, CatalogError> {
        self.session
            .current_user()
            .ok_or(CatalogError::AuthRequired)
    }

    fn cached_for(&self, user: UserId) -> Option<HashSet<CourseId>> {
        let guard = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cache| cache.user == user)
            .map(|cache| cache.ids.clone())
    }

    fn store_cache(&self, user: UserId, ids: HashSet<CourseId>) {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(EnrolledCache { user, ids });
    }

    fn cache_insert(&self, user: UserId, course_id: CourseId) {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cache) = guard.as_mut() {
            if cache.user == user {
                cache.ids.insert(course_id);
            }
        }
    }
}
