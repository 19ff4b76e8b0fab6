use academy_core::model::{Course, CourseId};

use super::SqliteRepository;
use super::mapping::{course_id_from_i64, course_id_to_i64, map_course_row};
use crate::repository::{CourseRepository, NewCourseRecord, StorageError};

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn list_courses(&self, limit: Option<u32>) -> Result<Vec<Course>, StorageError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1_i64, i64::from);
        let rows = sqlx::query(
            r"
            SELECT id, title, description, instructor, thumbnail_url, video_url, rating, created_at
            FROM courses
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            courses.push(map_course_row(&row)?);
        }
        Ok(courses)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, instructor, thumbnail_url, video_url, rating, created_at
            FROM courses WHERE id = ?1
            ",
        )
        .bind(course_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_course_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO courses (title, description, instructor, thumbnail_url, video_url, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(record.title)
        .bind(record.description)
        .bind(record.instructor)
        .bind(record.thumbnail_url)
        .bind(record.video_url)
        .bind(f64::from(record.rating))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        course_id_from_i64(res.last_insert_rowid())
    }
}
