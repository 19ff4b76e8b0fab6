use academy_core::model::{CourseId, Progress};
use services::DashboardSnapshot;

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRowVm {
    pub course_id: CourseId,
    pub title: String,
    pub video_url: String,
    pub thumbnail: Option<String>,
    pub progress: Progress,
    pub percent_label: String,
    pub completed: bool,
    pub action_label: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardVm {
    pub rows: Vec<DashboardRowVm>,
    pub enrolled_label: String,
    pub average_label: String,
    pub completed_label: String,
}

/// Call-to-action wording for a saved percent.
#[must_use]
pub fn continue_label(progress: Progress) -> &'static str {
    if progress.is_complete() {
        "Start Again"
    } else if progress == Progress::ZERO {
        "Start Now"
    } else {
        "Continue Watching"
    }
}

#[must_use]
pub fn map_dashboard(snapshot: &DashboardSnapshot) -> DashboardVm {
    let rows = snapshot
        .rows
        .iter()
        .map(|row| DashboardRowVm {
            course_id: row.course_id,
            title: row.title.clone(),
            video_url: row.video.to_string(),
            thumbnail: row.thumbnail.as_ref().map(ToString::to_string),
            progress: row.progress,
            percent_label: format!("{}%", row.progress.value()),
            completed: row.progress.is_complete(),
            action_label: continue_label(row.progress),
        })
        .collect();
    DashboardVm {
        rows,
        enrolled_label: snapshot.stats.enrolled.to_string(),
        average_label: format!("{}%", snapshot.stats.average.value()),
        completed_label: snapshot.stats.completed.to_string(),
    }
}
