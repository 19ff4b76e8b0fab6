use std::sync::Arc;

use academy_core::model::{AuthUser, Course, CourseId, Progress, UserId};
use academy_core::time::fixed_now;
use storage::repository::{
    CourseRepository, InMemoryRepository, NewCourseRecord, Storage, StorageError,
};

use super::test_harness::{
    ViewKind, setup_player_harness, setup_view_harness, setup_view_harness_with_storage,
};
use crate::context::PlayerLaunch;

fn course_record(title: &str) -> NewCourseRecord {
    NewCourseRecord {
        title: title.to_owned(),
        description: Some("Build something real.".into()),
        instructor: Some("Ada".into()),
        thumbnail_url: None,
        video_url: format!("https://cdn.example.com/{title}.mp4"),
        rating: 4.5,
        created_at: fixed_now(),
    }
}

fn test_user(email: &str) -> AuthUser {
    AuthUser::new(UserId::for_email(email), email, None).expect("valid user")
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_featured_cards() {
    let storage = Storage::in_memory();
    storage
        .courses
        .insert_course(course_record("rust-basics"))
        .await
        .expect("insert course");

    let mut harness = setup_view_harness_with_storage(ViewKind::Home, storage);
    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("Learn anything, keep your place."),
        "missing hero in {html}"
    );
    assert!(html.contains("rust-basics"), "missing course title in {html}");
    assert!(html.contains("Available"), "missing chip in {html}");
    assert!(html.contains("Enroll"), "missing enroll button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_renders_empty_state() {
    let mut harness = setup_view_harness(ViewKind::Courses);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("All Courses"), "missing heading in {html}");
    assert!(
        html.contains("No courses published yet."),
        "missing empty state in {html}"
    );
}

struct FailingCourseRepo;

#[async_trait::async_trait]
impl CourseRepository for FailingCourseRepo {
    async fn list_courses(&self, _limit: Option<u32>) -> Result<Vec<Course>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_course(&self, _id: CourseId) -> Result<Option<Course>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn insert_course(&self, _record: NewCourseRecord) -> Result<CourseId, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn courses_view_smoke_renders_error_state() {
    let storage = Storage {
        courses: Arc::new(FailingCourseRepo),
        enrollments: Arc::new(InMemoryRepository::new()),
    };
    let mut harness = setup_view_harness_with_storage(ViewKind::Courses, storage);
    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("We couldn't reach your courses."),
        "missing error in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_prompts_for_sign_in() {
    let mut harness = setup_view_harness(ViewKind::Dashboard);
    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("Please log in first!"),
        "missing sign-in prompt in {html}"
    );
    assert!(html.contains("Log In"), "missing login link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_rows_and_stats() {
    let harness_seed = Storage::in_memory();
    let ongoing = harness_seed
        .courses
        .insert_course(course_record("ownership"))
        .await
        .expect("insert course");
    let finished = harness_seed
        .courses
        .insert_course(course_record("lifetimes"))
        .await
        .expect("insert course");

    let mut harness = setup_view_harness_with_storage(ViewKind::Dashboard, harness_seed);
    let user = test_user("dana@example.com");
    let user_id = user.id();
    harness.services.session().sign_in(user);
    harness
        .services
        .catalog()
        .enroll(ongoing)
        .await
        .expect("enroll");
    harness
        .services
        .catalog()
        .enroll(finished)
        .await
        .expect("enroll");
    harness
        .storage
        .enrollments
        .set_progress(user_id, ongoing, Progress::new(40).expect("progress"))
        .await
        .expect("set progress");
    harness
        .storage
        .enrollments
        .set_progress(user_id, finished, Progress::COMPLETE)
        .await
        .expect("set progress");

    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Total Enrolled"), "missing stats in {html}");
    assert!(html.contains("70%"), "missing average in {html}");
    assert!(
        html.contains("Continue Watching"),
        "missing resume action in {html}"
    );
    assert!(
        html.contains("Start Again"),
        "missing restart action in {html}"
    );
    assert!(html.contains("Completed"), "missing completed tag in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_empty_enrollments() {
    let mut harness = setup_view_harness(ViewKind::Dashboard);
    harness.services.session().sign_in(test_user("sam@example.com"));
    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("You're not enrolled in any courses yet."),
        "missing empty state in {html}"
    );
    assert!(
        html.contains("Find one to start"),
        "missing catalog link in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_smoke_renders_fallback_without_launch() {
    let mut harness = setup_view_harness(ViewKind::Player);
    harness.rebuild();
    let html = harness.render();
    assert!(
        html.contains("No video selected."),
        "missing fallback in {html}"
    );
    assert!(
        html.contains("Back to dashboard"),
        "missing dashboard link in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn player_view_smoke_renders_controls_for_launch() {
    let launch = PlayerLaunch {
        course_id: None,
        title: "Intro to Loops".to_owned(),
        video_url: "https://cdn.example.com/intro.mp4".to_owned(),
        saved_progress: None,
    };
    let mut harness =
        setup_player_harness(ViewKind::Player, Storage::in_memory(), Some(launch));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Intro to Loops"), "missing title in {html}");
    assert!(html.contains("Play"), "missing play button in {html}");
    assert!(html.contains("1.5x"), "missing rate menu in {html}");
    assert!(html.contains("Fullscreen"), "missing fullscreen in {html}");
    assert!(html.contains("0:00"), "missing time label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_smoke_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Log In"), "missing heading in {html}");
    assert!(
        html.contains("you@example.com"),
        "missing email field in {html}"
    );
    assert!(
        html.contains("Display name (optional)"),
        "missing name field in {html}"
    );
}
