mod course_vm;
mod dashboard_vm;
mod player_vm;

pub use course_vm::{
    CourseCardVm, FALLBACK_DESCRIPTION, FALLBACK_INSTRUCTOR, map_course_card, map_course_cards,
    stars_label,
};
pub use dashboard_vm::{DashboardRowVm, DashboardVm, continue_label, map_dashboard};
pub use player_vm::{MediaSnapshot, format_media_time, snapshot_events, time_display};
