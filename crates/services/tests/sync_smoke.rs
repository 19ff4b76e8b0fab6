use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use academy_core::model::{AuthUser, CourseId, Enrollment, Progress, UserId};
use academy_core::time::{fixed_clock, fixed_now};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use services::{AppServices, PlaybackSession, SYNC_INTERVAL};
use storage::repository::{
    CourseRepository, DashboardRow, EnrollmentRepository, InMemoryRepository, NewCourseRecord,
    Storage, StorageError,
};

struct CountingRepo {
    inner: InMemoryRepository,
    writes: AtomicUsize,
}

#[async_trait]
impl EnrollmentRepository for CountingRepo {
    async fn enrolled_course_ids(&self, user: UserId) -> Result<Vec<CourseId>, StorageError> {
        self.inner.enrolled_course_ids(user).await
    }

    async fn find_enrollment(
        &self,
        user: UserId,
        course: CourseId,
    ) -> Result<Option<Enrollment>, StorageError> {
        self.inner.find_enrollment(user, course).await
    }

    async fn insert_enrollment(
        &self,
        user: UserId,
        course: CourseId,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment, StorageError> {
        self.inner.insert_enrollment(user, course, enrolled_at).await
    }

    async fn set_progress(
        &self,
        user: UserId,
        course: CourseId,
        progress: Progress,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_progress(user, course, progress).await
    }

    async fn dashboard_rows(&self, user: UserId) -> Result<Vec<DashboardRow>, StorageError> {
        self.inner.dashboard_rows(user).await
    }
}

async fn fixture() -> (Arc<CountingRepo>, UserId, CourseId) {
    let inner = InMemoryRepository::new();
    let user = UserId::generate();
    let course = inner
        .insert_course(NewCourseRecord {
            title: "intro-to-rust".to_owned(),
            description: None,
            instructor: None,
            thumbnail_url: None,
            video_url: "https://cdn.example.com/intro-to-rust.mp4".to_owned(),
            rating: 4.5,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    inner
        .insert_enrollment(user, course, fixed_now())
        .await
        .unwrap();
    let repo = Arc::new(CountingRepo {
        inner,
        writes: AtomicUsize::new(0),
    });
    (repo, user, course)
}

async fn stored(repo: &CountingRepo, user: UserId, course: CourseId) -> Progress {
    repo.find_enrollment(user, course)
        .await
        .unwrap()
        .unwrap()
        .progress()
}

/// Lets the spawned sampler run after the paused clock moved.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn sampler_writes_on_the_cadence() {
    let (repo, user, course) = fixture().await;
    let mut session = PlaybackSession::new(Some(user), Some(course));
    let playhead = session.playhead();
    playhead.update(75.0, Some(100.0));
    session.start_sync(repo.clone(), None, Duration::from_secs(5));
    assert!(session.is_syncing());

    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
    assert_eq!(stored(&repo, user, course).await, Progress::new(75).unwrap());

    playhead.update(80.0, Some(100.0));
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 2);
    assert_eq!(stored(&repo, user, course).await, Progress::new(80).unwrap());
}

#[tokio::test(start_paused = true)]
async fn sampler_skips_an_unmoved_percent() {
    let (repo, user, course) = fixture().await;
    let mut session = PlaybackSession::new(Some(user), Some(course));
    let playhead = session.playhead();
    playhead.update(50.0, Some(100.0));
    session.start_sync(repo.clone(), None, Duration::from_secs(5));

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);

    playhead.update(51.0, Some(100.0));
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelled_sampler_stops_writing() {
    let (repo, user, course) = fixture().await;
    let mut session = PlaybackSession::new(Some(user), Some(course));
    let playhead = session.playhead();
    playhead.update(25.0, Some(100.0));
    session.start_sync(repo.clone(), None, Duration::from_secs(5));

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);

    session.stop_sync();
    assert!(!session.is_syncing());

    playhead.update(90.0, Some(100.0));
    tokio::time::advance(Duration::from_secs(20)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_aborts_the_sampler() {
    let (repo, user, course) = fixture().await;
    let mut session = PlaybackSession::new(Some(user), Some(course));
    let playhead = session.playhead();
    playhead.update(25.0, Some(100.0));
    session.start_sync(repo.clone(), None, Duration::from_secs(5));

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);

    drop(session);
    playhead.update(90.0, Some(100.0));
    tokio::time::advance(Duration::from_secs(20)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn app_services_seeded_sampler_syncs_through_the_catalog() {
    let storage = Storage::in_memory();
    let services = AppServices::from_storage(&storage, fixed_clock());
    let user = UserId::generate();
    services
        .session()
        .sign_in(AuthUser::new(user, "dana@example.com", None).unwrap());

    let course = storage
        .courses
        .insert_course(NewCourseRecord {
            title: "intro-to-rust".to_owned(),
            description: None,
            instructor: None,
            thumbnail_url: None,
            video_url: "https://cdn.example.com/intro-to-rust.mp4".to_owned(),
            rating: 4.5,
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    services.catalog().enroll(course).await.unwrap();
    storage
        .enrollments
        .set_progress(user, course, Progress::new(60).unwrap())
        .await
        .unwrap();

    let mut session = services.begin_playback(Some(course));
    let playhead = session.playhead();
    playhead.update(60.0, Some(100.0));
    services.start_progress_sync(&mut session, Some(Progress::new(60).unwrap()), SYNC_INTERVAL);
    assert!(session.is_syncing());

    // Seeded with the resumed percent, the first beat has nothing new to write.
    tokio::time::advance(SYNC_INTERVAL).await;
    settle().await;
    assert_eq!(
        services.catalog().saved_progress(course).await.unwrap(),
        Some(Progress::new(60).unwrap())
    );

    playhead.update(75.0, Some(100.0));
    tokio::time::advance(SYNC_INTERVAL).await;
    settle().await;
    assert_eq!(
        services.catalog().saved_progress(course).await.unwrap(),
        Some(Progress::new(75).unwrap())
    );
}

#[tokio::test(start_paused = true)]
async fn anonymous_playback_never_spawns_a_sampler() {
    let (repo, _user, course) = fixture().await;
    let mut session = PlaybackSession::new(None, Some(course));
    session.playhead().update(75.0, Some(100.0));
    session.start_sync(repo.clone(), None, Duration::from_secs(5));
    assert!(!session.is_syncing());

    tokio::time::advance(Duration::from_secs(20)).await;
    settle().await;
    assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
}
