use async_trait::async_trait;
use chrono::{DateTime, Utc};
use academy_core::model::{Course, CourseId, Enrollment, MediaRef, Progress, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Input shape for publishing a course.
///
/// The store assigns the id; everything else arrives as raw text and is
/// validated into a domain `Course` on the way back out.
#[derive(Debug, Clone)]
pub struct NewCourseRecord {
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
}

/// One row of the dashboard join: a user's enrollment plus the course
/// fields the dashboard renders. Enrollments whose course no longer exists
/// never appear here; the join drops them.
#[derive(Debug, Clone)]
pub struct DashboardRow {
    pub course_id: CourseId,
    pub title: String,
    pub video: MediaRef,
    pub thumbnail: Option<MediaRef>,
    pub progress: Progress,
}

/// Repository contract for the published course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// List courses, newest first. `None` means no limit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn list_courses(&self, limit: Option<u32>) -> Result<Vec<Course>, StorageError>;

    /// Fetch a single course by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failure; a missing course is `Ok(None)`.
    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Publish a new course and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored or fails
    /// validation.
    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, StorageError>;
}

/// Repository contract for per-user enrollments and their saved progress.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Ids of every course the user is enrolled in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the enrollment set cannot be read.
    async fn enrolled_course_ids(&self, user: UserId) -> Result<Vec<CourseId>, StorageError>;

    /// Fetch one user's enrollment in one course, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failure; not being enrolled is
    /// `Ok(None)`.
    async fn find_enrollment(
        &self,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, StorageError>;

    /// Create an enrollment at zero progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the `(user, course)` pair already
    /// exists. Uniqueness is enforced here, in the store, so racing callers
    /// cannot double-enroll.
    async fn insert_enrollment(
        &self,
        user: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError>;

    /// Record saved progress for an enrollment.
    ///
    /// The write is monotonic: the stored value only ever moves up
    /// (`MAX(stored, incoming)`), so a stale sample that lands late cannot
    /// undo a newer, higher one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user is not enrolled in the
    /// course.
    async fn set_progress(
        &self,
        user: UserId,
        course: CourseId,
        progress: Progress,
    ) -> Result<(), StorageError>;

    /// The dashboard join for one user, ordered by progress descending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the join cannot be read.
    async fn dashboard_rows(&self, user: UserId) -> Result<Vec<DashboardRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
    enrollments: Arc<Mutex<HashMap<(UserId, CourseId), Enrollment>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            courses: Arc::new(Mutex::new(HashMap::new())),
            enrollments: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn course_from_record(id: CourseId, record: NewCourseRecord) -> Result<Course, StorageError> {
    let thumbnail = record
        .thumbnail_url
        .as_deref()
        .map(MediaRef::parse)
        .transpose()
        .map_err(ser)?;
    let video = MediaRef::parse(&record.video_url).map_err(ser)?;
    Course::new(
        id,
        record.title,
        record.description,
        record.instructor,
        thumbnail,
        video,
        record.rating,
        record.created_at,
    )
    .map_err(ser)
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn list_courses(&self, limit: Option<u32>) -> Result<Vec<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(b.id().cmp(&a.id()))
        });
        if let Some(limit) = limit {
            courses.truncate(limit as usize);
        }
        Ok(courses)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = guard
            .keys()
            .map(|id| id.value())
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let id = CourseId::new(next);
        let course = course_from_record(id, record)?;
        guard.insert(id, course);
        Ok(id)
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryRepository {
    async fn enrolled_course_ids(&self, user: UserId) -> Result<Vec<CourseId>, StorageError> {
        let guard = self
            .enrollments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut ids: Vec<CourseId> = guard
            .keys()
            .filter(|(u, _)| *u == user)
            .map(|(_, c)| *c)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn find_enrollment(
        &self,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let guard = self
            .enrollments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(user, course)).cloned())
    }

    async fn insert_enrollment(
        &self,
        user: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        let mut guard = self
            .enrollments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&(user, course)) {
            return Err(StorageError::Conflict);
        }
        let enrollment = Enrollment::new(user, course, Progress::ZERO, enrolled_at);
        guard.insert((user, course), enrollment.clone());
        Ok(enrollment)
    }

    async fn set_progress(
        &self,
        user: UserId,
        course: CourseId,
        progress: Progress,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .enrollments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let existing = guard.get(&(user, course)).ok_or(StorageError::NotFound)?;
        let kept = existing.progress().max(progress);
        let updated = Enrollment::new(user, course, kept, existing.enrolled_at());
        guard.insert((user, course), updated);
        Ok(())
    }

    async fn dashboard_rows(&self, user: UserId) -> Result<Vec<DashboardRow>, StorageError> {
        let enrollments = self
            .enrollments
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let courses = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut rows: Vec<DashboardRow> = enrollments
            .values()
            .filter(|e| e.user_id() == user)
            .filter_map(|e| {
                let course = courses.get(&e.course_id())?;
                Some(DashboardRow {
                    course_id: course.id(),
                    title: course.title().to_owned(),
                    video: course.video().clone(),
                    thumbnail: course.thumbnail().cloned(),
                    progress: e.progress(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.progress.cmp(&a.progress).then(a.course_id.cmp(&b.course_id)));
        Ok(rows)
    }
}

/// Aggregates course and enrollment repositories behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let enrollments: Arc<dyn EnrollmentRepository> = Arc::new(repo);
        Self {
            courses,
            enrollments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_now;
    use chrono::Duration;

    fn record(title: &str, created_at: DateTime<Utc>) -> NewCourseRecord {
        NewCourseRecord {
            title: title.to_owned(),
            description: Some("hands-on".into()),
            instructor: Some("Ada".into()),
            thumbnail_url: None,
            video_url: format!("https://cdn.example.com/{title}.mp4"),
            rating: 4.0,
            created_at,
        }
    }

    #[tokio::test]
    async fn list_courses_orders_newest_first() {
        let repo = InMemoryRepository::new();
        let base = fixed_now();
        repo.insert_course(record("oldest", base)).await.unwrap();
        repo.insert_course(record("middle", base + Duration::hours(1)))
            .await
            .unwrap();
        repo.insert_course(record("newest", base + Duration::hours(2)))
            .await
            .unwrap();

        let courses = repo.list_courses(None).await.unwrap();
        let titles: Vec<&str> = courses.iter().map(Course::title).collect();
        assert_eq!(titles, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn list_courses_applies_limit() {
        let repo = InMemoryRepository::new();
        let base = fixed_now();
        for i in 0..4 {
            repo.insert_course(record(&format!("c{i}"), base + Duration::hours(i)))
                .await
                .unwrap();
        }

        let courses = repo.list_courses(Some(2)).await.unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].title(), "c3");
    }

    #[tokio::test]
    async fn insert_course_assigns_increasing_ids() {
        let repo = InMemoryRepository::new();
        let a = repo.insert_course(record("a", fixed_now())).await.unwrap();
        let b = repo.insert_course(record("b", fixed_now())).await.unwrap();
        assert!(b > a);
        assert!(repo.get_course(a).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn enrollment_starts_at_zero_and_rejects_duplicates() {
        let repo = InMemoryRepository::new();
        let course = repo.insert_course(record("a", fixed_now())).await.unwrap();
        let user = UserId::generate();

        let enrollment = repo
            .insert_enrollment(user, course, fixed_now())
            .await
            .unwrap();
        assert_eq!(enrollment.progress(), Progress::ZERO);

        let err = repo
            .insert_enrollment(user, course, fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn set_progress_never_moves_down() {
        let repo = InMemoryRepository::new();
        let course = repo.insert_course(record("a", fixed_now())).await.unwrap();
        let user = UserId::generate();
        repo.insert_enrollment(user, course, fixed_now())
            .await
            .unwrap();

        repo.set_progress(user, course, Progress::new(60).unwrap())
            .await
            .unwrap();
        repo.set_progress(user, course, Progress::new(40).unwrap())
            .await
            .unwrap();

        let found = repo.find_enrollment(user, course).await.unwrap().unwrap();
        assert_eq!(found.progress().value(), 60);

        repo.set_progress(user, course, Progress::new(80).unwrap())
            .await
            .unwrap();
        let found = repo.find_enrollment(user, course).await.unwrap().unwrap();
        assert_eq!(found.progress().value(), 80);
    }

    #[tokio::test]
    async fn set_progress_requires_enrollment() {
        let repo = InMemoryRepository::new();
        let course = repo.insert_course(record("a", fixed_now())).await.unwrap();
        let err = repo
            .set_progress(UserId::generate(), course, Progress::COMPLETE)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn dashboard_rows_sort_by_progress_descending() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let base = fixed_now();
        let low = repo.insert_course(record("low", base)).await.unwrap();
        let high = repo
            .insert_course(record("high", base + Duration::hours(1)))
            .await
            .unwrap();

        repo.insert_enrollment(user, low, base).await.unwrap();
        repo.insert_enrollment(user, high, base).await.unwrap();
        repo.set_progress(user, low, Progress::new(10).unwrap())
            .await
            .unwrap();
        repo.set_progress(user, high, Progress::new(90).unwrap())
            .await
            .unwrap();

        let rows = repo.dashboard_rows(user).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "high");
        assert_eq!(rows[0].progress.value(), 90);
        assert_eq!(rows[1].title, "low");
    }

    #[tokio::test]
    async fn dashboard_rows_drop_enrollments_without_a_course() {
        let repo = InMemoryRepository::new();
        let user = UserId::generate();
        let course = repo.insert_course(record("kept", fixed_now())).await.unwrap();
        repo.insert_enrollment(user, course, fixed_now())
            .await
            .unwrap();
        // no such course in the catalog
        repo.insert_enrollment(user, CourseId::new(999), fixed_now())
            .await
            .unwrap();

        let rows = repo.dashboard_rows(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "kept");
    }

    #[tokio::test]
    async fn dashboard_rows_are_scoped_to_the_user() {
        let repo = InMemoryRepository::new();
        let course = repo.insert_course(record("a", fixed_now())).await.unwrap();
        let mine = UserId::generate();
        let theirs = UserId::generate();
        repo.insert_enrollment(mine, course, fixed_now())
            .await
            .unwrap();
        repo.insert_enrollment(theirs, course, fixed_now())
            .await
            .unwrap();

        let rows = repo.dashboard_rows(mine).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(repo.enrolled_course_ids(theirs).await.unwrap().len(), 1);
    }
}
