use academy_core::model::{CourseId, Enrollment, Progress, UserId};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    course_id_from_i64, course_id_to_i64, map_dashboard_row, progress_from_i64, ser,
    user_id_from_str,
};
use crate::repository::{DashboardRow, EnrollmentRepository, StorageError};

fn map_enrollment_row(row: &SqliteRow) -> Result<Enrollment, StorageError> {
    Ok(Enrollment::new(
        user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
        course_id_from_i64(row.try_get::<i64, _>("course_id").map_err(ser)?)?,
        progress_from_i64(row.try_get::<i64, _>("progress").map_err(ser)?)?,
        row.try_get("enrolled_at").map_err(ser)?,
    ))
}

fn map_insert_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            StorageError::Conflict
        }
        _ => StorageError::Connection(e.to_string()),
    }
}

#[async_trait::async_trait]
impl EnrollmentRepository for SqliteRepository {
    async fn enrolled_course_ids(&self, user: UserId) -> Result<Vec<CourseId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT course_id FROM enrollments
            WHERE user_id = ?1
            ORDER BY course_id ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(course_id_from_i64(
                row.try_get::<i64, _>("course_id").map_err(ser)?,
            )?);
        }
        Ok(ids)
    }

    async fn find_enrollment(
        &self,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, course_id, progress, enrolled_at
            FROM enrollments
            WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(user.to_string())
        .bind(course_id_to_i64(course)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_enrollment_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn insert_enrollment(
        &self,
        user: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        sqlx::query(
            r"
            INSERT INTO enrollments (user_id, course_id, progress, enrolled_at)
            VALUES (?1, ?2, 0, ?3)
            ",
        )
        .bind(user.to_string())
        .bind(course_id_to_i64(course)?)
        .bind(enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_err)?;

        Ok(Enrollment::new(user, course, Progress::ZERO, enrolled_at))
    }

    async fn set_progress(
        &self,
        user: UserId,
        course: CourseId,
        progress: Progress,
    ) -> Result<(), StorageError> {
        // MAX keeps the stored value monotonic under overlapping writers.
        let res = sqlx::query(
            r"
            UPDATE enrollments
            SET progress = MAX(progress, ?3)
            WHERE user_id = ?1 AND course_id = ?2
            ",
        )
        .bind(user.to_string())
        .bind(course_id_to_i64(course)?)
        .bind(i64::from(progress.value()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn dashboard_rows(&self, user: UserId) -> Result<Vec<DashboardRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT e.progress, c.id AS course_id, c.title, c.video_url, c.thumbnail_url
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = ?1
            ORDER BY e.progress DESC, c.id ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_dashboard_row(&row)?);
        }
        Ok(out)
    }
}
