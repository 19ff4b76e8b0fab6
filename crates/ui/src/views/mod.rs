mod course_card;
mod courses;
mod dashboard;
mod home;
mod login;
mod player;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use courses::CoursesView;
pub use dashboard::DashboardView;
pub use home::HomeView;
pub use login::LoginView;
pub use player::PlayerView;
pub use state::{ViewError, ViewState, use_current_user, view_state_from_resource};

pub(crate) use state::enrolled_ids_or_empty;
