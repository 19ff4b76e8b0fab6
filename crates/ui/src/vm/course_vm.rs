use std::collections::HashSet;

use academy_core::model::{Course, CourseId};

/// Shown when a course record carries no instructor of its own.
pub const FALLBACK_INSTRUCTOR: &str = "Loop Academy";
/// Shown when a course record carries no description.
pub const FALLBACK_DESCRIPTION: &str = "No description provided.";

#[derive(Clone, Debug, PartialEq)]
pub struct CourseCardVm {
    pub course_id: CourseId,
    pub title: String,
    pub instructor: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub video_url: String,
    pub stars: String,
    pub rating_label: String,
    pub enrolled: bool,
}

#[must_use]
pub fn map_course_card(course: &Course, enrolled: bool) -> CourseCardVm {
    CourseCardVm {
        course_id: course.id(),
        title: course.title().to_owned(),
        instructor: course
            .instructor()
            .unwrap_or(FALLBACK_INSTRUCTOR)
            .to_owned(),
        description: course
            .description()
            .unwrap_or(FALLBACK_DESCRIPTION)
            .to_owned(),
        thumbnail: course.thumbnail().map(ToString::to_string),
        video_url: course.video().to_string(),
        stars: stars_label(course.rating()),
        rating_label: format!("{:.1}", course.rating()),
        enrolled,
    }
}

#[must_use]
pub fn map_course_cards(courses: &[Course], enrolled: &HashSet<CourseId>) -> Vec<CourseCardVm> {
    courses
        .iter()
        .map(|course| map_course_card(course, enrolled.contains(&course.id())))
        .collect()
}

/// Five-star strip, rating rounded to the nearest whole star.
#[must_use]
pub fn stars_label(rating: f32) -> String {
    let rounded = rating.clamp(0.0, 5.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = rounded as usize;
    let mut label = "★".repeat(filled);
    label.push_str(&"☆".repeat(5 - filled));
    label
}
