use std::env;
use std::sync::Arc;

use academy_core::model::{Course, CourseId, Enrollment, MediaRef, Progress, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::repository::{
    CourseRepository, DashboardRow, EnrollmentRepository, NewCourseRecord, Storage, StorageError,
};

/// Connection settings for a hosted PostgREST-style record store.
#[derive(Clone, Debug)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestStoreConfig {
    /// Reads `ACADEMY_STORE_URL` and `ACADEMY_STORE_KEY`. Returns `None`
    /// when either is missing, which callers treat as "use a local backend".
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ACADEMY_STORE_URL").ok()?;
        let api_key = env::var("ACADEMY_STORE_KEY").ok()?;
        if base_url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        Some(Self { base_url, api_key })
    }
}

/// Remote record store speaking the PostgREST filter dialect
/// (`column=eq.value` query params, embedded joins in `select=`).
#[derive(Clone)]
pub struct RestRepository {
    client: Client,
    config: RestStoreConfig,
}

impl RestRepository {
    #[must_use]
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/{table}", self.config.base_url.trim_end_matches('/'))
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
    }

    fn patch(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .patch(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
    }
}

fn conn(e: reqwest::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status == reqwest::StatusCode::CONFLICT {
        return Err(StorageError::Conflict);
    }
    if !status.is_success() {
        return Err(StorageError::Connection(format!("http status {status}")));
    }
    Ok(response)
}

//
// ─── ROW PAYLOADS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct CourseRow {
    id: i64,
    title: String,
    description: Option<String>,
    instructor: Option<String>,
    thumbnail_url: Option<String>,
    video_url: String,
    rating: f64,
    created_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self) -> Result<Course, StorageError> {
        let id = course_id_from_row(self.id)?;
        let thumbnail = self
            .thumbnail_url
            .as_deref()
            .map(MediaRef::parse)
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let video = MediaRef::parse(&self.video_url)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        #[allow(clippy::cast_possible_truncation)]
        let rating = self.rating as f32;

        Course::new(
            id,
            self.title,
            self.description,
            self.instructor,
            thumbnail,
            video,
            rating,
            self.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct NewCoursePayload {
    title: String,
    description: Option<String>,
    instructor: Option<String>,
    thumbnail_url: Option<String>,
    video_url: String,
    rating: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentRow {
    user_id: UserId,
    course_id: i64,
    progress: i64,
    enrolled_at: DateTime<Utc>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> Result<Enrollment, StorageError> {
        Ok(Enrollment::new(
            self.user_id,
            course_id_from_row(self.course_id)?,
            progress_from_row(self.progress)?,
            self.enrolled_at,
        ))
    }
}

#[derive(Debug, Serialize)]
struct NewEnrollmentPayload {
    user_id: UserId,
    course_id: i64,
    progress: i64,
    enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ProgressPatch {
    progress: i64,
}

#[derive(Debug, Deserialize)]
struct CourseIdRow {
    course_id: i64,
}

/// One row of the embedded dashboard join. The nested course is `null` when
/// the enrollment dangles; those rows are dropped by the caller.
#[derive(Debug, Deserialize)]
struct JoinedRow {
    progress: i64,
    courses: Option<JoinedCourse>,
}

#[derive(Debug, Deserialize)]
struct JoinedCourse {
    id: i64,
    title: String,
    video_url: String,
    thumbnail_url: Option<String>,
}

fn course_id_from_row(v: i64) -> Result<CourseId, StorageError> {
    u64::try_from(v)
        .map(CourseId::new)
        .map_err(|_| StorageError::Serialization("course id sign overflow".into()))
}

fn course_id_to_row(id: CourseId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("course id overflow".into()))
}

fn progress_from_row(v: i64) -> Result<Progress, StorageError> {
    let percent = u8::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid progress: {v}")))?;
    Progress::new(percent).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn joined_row_into_dashboard(row: JoinedRow) -> Result<Option<DashboardRow>, StorageError> {
    let Some(course) = row.courses else {
        return Ok(None);
    };
    let video = MediaRef::parse(&course.video_url)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let thumbnail = course
        .thumbnail_url
        .as_deref()
        .map(MediaRef::parse)
        .transpose()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(Some(DashboardRow {
        course_id: course_id_from_row(course.id)?,
        title: course.title,
        video,
        thumbnail,
        progress: progress_from_row(row.progress)?,
    }))
}

//
// ─── REPOSITORY IMPLS ──────────────────────────────────────────────────────────
//

#[async_trait]
impl CourseRepository for RestRepository {
    async fn list_courses(&self, limit: Option<u32>) -> Result<Vec<Course>, StorageError> {
        let mut url = format!(
            "{}?select=*&order=created_at.desc",
            self.endpoint("courses")
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={limit}"));
        }

        let response = self.get(url).send().await.map_err(conn)?;
        let rows: Vec<CourseRow> = check_status(response)?.json().await.map_err(conn)?;
        rows.into_iter().map(CourseRow::into_course).collect()
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let url = format!(
            "{}?select=*&id=eq.{}",
            self.endpoint("courses"),
            id.value()
        );
        let response = self.get(url).send().await.map_err(conn)?;
        let rows: Vec<CourseRow> = check_status(response)?.json().await.map_err(conn)?;
        rows.into_iter().next().map(CourseRow::into_course).transpose()
    }

    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, StorageError> {
        let payload = NewCoursePayload {
            title: record.title,
            description: record.description,
            instructor: record.instructor,
            thumbnail_url: record.thumbnail_url,
            video_url: record.video_url,
            rating: f64::from(record.rating),
            created_at: record.created_at,
        };

        let response = self
            .post(self.endpoint("courses"))
            .json(&payload)
            .send()
            .await
            .map_err(conn)?;
        let rows: Vec<CourseRow> = check_status(response)?.json().await.map_err(conn)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Serialization("insert returned no row".into()))?;
        course_id_from_row(row.id)
    }
}

#[async_trait]
impl EnrollmentRepository for RestRepository {
    async fn enrolled_course_ids(&self, user: UserId) -> Result<Vec<CourseId>, StorageError> {
        let url = format!(
            "{}?select=course_id&user_id=eq.{user}",
            self.endpoint("enrollments")
        );
        let response = self.get(url).send().await.map_err(conn)?;
        let rows: Vec<CourseIdRow> = check_status(response)?.json().await.map_err(conn)?;
        rows.into_iter()
            .map(|r| course_id_from_row(r.course_id))
            .collect()
    }

    async fn find_enrollment(
        &self,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let url = format!(
            "{}?select=user_id,course_id,progress,enrolled_at&user_id=eq.{user}&course_id=eq.{}",
            self.endpoint("enrollments"),
            course.value()
        );
        let response = self.get(url).send().await.map_err(conn)?;
        let rows: Vec<EnrollmentRow> = check_status(response)?.json().await.map_err(conn)?;
        rows.into_iter()
            .next()
            .map(EnrollmentRow::into_enrollment)
            .transpose()
    }

    async fn insert_enrollment(
        &self,
        user: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        let payload = NewEnrollmentPayload {
            user_id: user,
            course_id: course_id_to_row(course)?,
            progress: 0,
            enrolled_at,
        };

        let response = self
            .post(self.endpoint("enrollments"))
            .json(&payload)
            .send()
            .await
            .map_err(conn)?;
        let rows: Vec<EnrollmentRow> = check_status(response)?.json().await.map_err(conn)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Serialization("insert returned no row".into()))?;
        row.into_enrollment()
    }

    async fn set_progress(
        &self,
        user: UserId,
        course: CourseId,
        progress: Progress,
    ) -> Result<(), StorageError> {
        // The `progress=lt.N` filter makes the write monotonic server-side:
        // the row is only touched while its stored value is lower.
        let url = format!(
            "{}?user_id=eq.{user}&course_id=eq.{}&progress=lt.{}",
            self.endpoint("enrollments"),
            course.value(),
            progress.value()
        );
        let patch = ProgressPatch {
            progress: i64::from(progress.value()),
        };

        let response = self.patch(url).json(&patch).send().await.map_err(conn)?;
        let rows: Vec<EnrollmentRow> = check_status(response)?.json().await.map_err(conn)?;
        if !rows.is_empty() {
            return Ok(());
        }

        // Nothing matched: either the stored value is already >= ours (fine)
        // or the enrollment does not exist.
        match self.find_enrollment(user, course).await? {
            Some(_) => {
                tracing::debug!(
                    course_id = course.value(),
                    percent = progress.value(),
                    "progress write skipped by monotonic guard"
                );
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }

    async fn dashboard_rows(&self, user: UserId) -> Result<Vec<DashboardRow>, StorageError> {
        let url = format!(
            "{}?select=progress,courses(id,title,video_url,thumbnail_url)&user_id=eq.{user}&order=progress.desc",
            self.endpoint("enrollments")
        );
        let response = self.get(url).send().await.map_err(conn)?;
        let rows: Vec<JoinedRow> = check_status(response)?.json().await.map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(mapped) = joined_row_into_dashboard(row)? {
                out.push(mapped);
            }
        }
        Ok(out)
    }
}

impl Storage {
    /// Build a `Storage` backed by a remote PostgREST-style store.
    #[must_use]
    pub fn rest(config: RestStoreConfig) -> Self {
        let repo = RestRepository::new(config);
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let enrollments: Arc<dyn EnrollmentRepository> = Arc::new(repo);
        Self {
            courses,
            enrollments,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_row_maps_into_domain() {
        let row: CourseRow = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Rust Basics",
                "description": null,
                "instructor": "Ada",
                "thumbnail_url": null,
                "video_url": "https://cdn.example.com/rust.mp4",
                "rating": 4.5,
                "created_at": "2023-11-14T22:13:20Z"
            }"#,
        )
        .unwrap();

        let course = row.into_course().unwrap();
        assert_eq!(course.id(), CourseId::new(7));
        assert_eq!(course.title(), "Rust Basics");
        assert_eq!(course.description(), None);
        assert!((course.rating() - 4.5).abs() < f32::EPSILON);
    }

    #[test]
    fn joined_row_with_null_course_is_dropped() {
        let row: JoinedRow = serde_json::from_str(r#"{"progress": 40, "courses": null}"#).unwrap();
        assert!(joined_row_into_dashboard(row).unwrap().is_none());
    }

    #[test]
    fn joined_row_maps_progress_and_course() {
        let row: JoinedRow = serde_json::from_str(
            r#"{
                "progress": 80,
                "courses": {
                    "id": 3,
                    "title": "Async Rust",
                    "video_url": "https://cdn.example.com/async.mp4",
                    "thumbnail_url": "https://cdn.example.com/async.png"
                }
            }"#,
        )
        .unwrap();

        let mapped = joined_row_into_dashboard(row).unwrap().unwrap();
        assert_eq!(mapped.course_id, CourseId::new(3));
        assert_eq!(mapped.progress.value(), 80);
        assert!(mapped.thumbnail.is_some());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let repo = RestRepository::new(RestStoreConfig {
            base_url: "https://store.example.com/rest/v1/".into(),
            api_key: "k".into(),
        });
        assert_eq!(
            repo.endpoint("courses"),
            "https://store.example.com/rest/v1/courses"
        );
    }

    #[test]
    fn out_of_range_progress_rows_are_rejected() {
        assert!(progress_from_row(101).is_err());
        assert!(progress_from_row(-1).is_err());
        assert!(progress_from_row(100).is_ok());
    }
}
