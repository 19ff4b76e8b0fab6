use academy_core::model::{Course, CourseId, MediaRef, Progress, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{DashboardRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn course_id_to_i64(id: CourseId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("course_id overflow".into()))
}

/// User ids are stored as their canonical hyphenated text form.
pub(crate) fn user_id_from_str(s: &str) -> Result<UserId, StorageError> {
    s.parse::<UserId>()
        .map_err(|_| StorageError::Serialization(format!("invalid user_id: {s}")))
}

pub(crate) fn progress_from_i64(v: i64) -> Result<Progress, StorageError> {
    let percent = u8::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid progress: {v}")))?;
    Progress::new(percent).map_err(ser)
}

pub(crate) fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let thumbnail = row
        .try_get::<Option<String>, _>("thumbnail_url")
        .map_err(ser)?
        .as_deref()
        .map(MediaRef::parse)
        .transpose()
        .map_err(ser)?;
    let video =
        MediaRef::parse(&row.try_get::<String, _>("video_url").map_err(ser)?).map_err(ser)?;

    #[allow(clippy::cast_possible_truncation)]
    let rating = row.try_get::<f64, _>("rating").map_err(ser)? as f32;

    Course::new(
        course_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        row.try_get::<Option<String>, _>("instructor").map_err(ser)?,
        thumbnail,
        video,
        rating,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_dashboard_row(row: &SqliteRow) -> Result<DashboardRow, StorageError> {
    let thumbnail = row
        .try_get::<Option<String>, _>("thumbnail_url")
        .map_err(ser)?
        .as_deref()
        .map(MediaRef::parse)
        .transpose()
        .map_err(ser)?;
    let video =
        MediaRef::parse(&row.try_get::<String, _>("video_url").map_err(ser)?).map_err(ser)?;

    Ok(DashboardRow {
        course_id: course_id_from_i64(row.try_get::<i64, _>("course_id").map_err(ser)?)?,
        title: row.try_get::<String, _>("title").map_err(ser)?,
        video,
        thumbnail,
        progress: progress_from_i64(row.try_get::<i64, _>("progress").map_err(ser)?)?,
    })
}
