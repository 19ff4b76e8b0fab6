//! Periodic persistence of the playhead.
//!
//! A playback session owns a [`SharedPlayhead`] the view writes on every
//! media time update and a sampler task that reads it on a fixed cadence.
//! Each beat folds the elapsed fraction into a whole percent and writes
//! it through the enrollment store only when it moved since the last
//! acknowledged write. A failed write is logged and retried on the next
//! beat; playback never notices.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use academy_core::model::{CourseId, Progress, UserId};
use storage::repository::EnrollmentRepository;
use tokio::task::JoinHandle;

/// How often the sampler persists the playhead.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Clone, Copy)]
struct PlayheadState {
    position: f64,
    duration: Option<f64>,
}

/// The playhead cell shared between the player view and the sampler.
#[derive(Clone, Default)]
pub struct SharedPlayhead {
    inner: Arc<Mutex<PlayheadState>>,
}

impl SharedPlayhead {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the media element's latest position and duration.
    /// Non-finite positions and missing or zero durations are ignored.
    pub fn update(&self, position: f64, duration: Option<f64>) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if position.is_finite() && position >= 0.0 {
            state.position = position;
        }
        state.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
    }

    /// Elapsed fraction in `[0, 1]`, `0.0` while the duration is unknown.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match state.duration {
            Some(duration) => (state.position / duration).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

/// What one sampler beat did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No user or no course attached; nothing will ever be written.
    Unarmed,
    /// Percent equals the last acknowledged write, so no write happened.
    Unchanged(Progress),
    /// The store acknowledged the write.
    Synced(Progress),
    /// The write failed and will be retried on the next beat.
    Retrying(Progress),
}

/// Decides, once per beat, whether the playhead percent gets persisted.
///
/// `last_synced` only advances when the store acknowledges a write, so a
/// failed write is retried on the next beat with no extra bookkeeping.
pub struct ProgressSyncEngine {
    enrollments: Arc<dyn EnrollmentRepository>,
    user_id: Option<UserId>,
    course_id: Option<CourseId>,
    last_synced: Option<Progress>,
}

impl ProgressSyncEngine {
    /// `last_synced` is usually seeded with the saved progress the player
    /// resumed from, so resuming does not immediately rewrite it.
    #[must_use]
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        user_id: Option<UserId>,
        course_id: Option<CourseId>,
        last_synced: Option<Progress>,
    ) -> Self {
        Self {
            enrollments,
            user_id,
            course_id,
            last_synced,
        }
    }

    /// True when both a user and a course are attached.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.user_id.is_some() && self.course_id.is_some()
    }

    #[must_use]
    pub fn last_synced(&self) -> Option<Progress> {
        self.last_synced
    }

    /// One sampler beat over the current elapsed `fraction`.
    pub async fn tick(&mut self, fraction: f64) -> SyncOutcome {
        let (Some(user), Some(course)) = (self.user_id, self.course_id) else {
            return SyncOutcome::Unarmed;
        };
        let percent = Progress::from_fraction(fraction);
        if self.last_synced == Some(percent) {
            return SyncOutcome::Unchanged(percent);
        }
        match self.enrollments.set_progress(user, course, percent).await {
            Ok(()) => {
                self.last_synced = Some(percent);
                tracing::debug!(%course, %percent, "progress synced");
                SyncOutcome::Synced(percent)
            }
            Err(err) => {
                tracing::warn!(%course, %percent, error = %err, "progress sync failed, will retry");
                SyncOutcome::Retrying(percent)
            }
        }
    }
}

/// Owning handle for a running sampler. Dropping it aborts the task.
pub struct SyncTask {
    handle: JoinHandle<()>,
}

impl SyncTask {
    /// Spawns the sampler loop: every `period`, read the playhead and
    /// hand the fraction to the engine.
    #[must_use]
    pub fn spawn(mut engine: ProgressSyncEngine, playhead: SharedPlayhead, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first interval tick completes immediately; skip it so
            // the first write lands one full period in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                engine.tick(playhead.fraction()).await;
            }
        });
        Self { handle }
    }

    /// Stops the sampler immediately.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One open player: who is watching what, the shared playhead, and the
/// sampler while it runs.
///
/// Dropping the session aborts the sampler, so a closed player cannot
/// keep writing progress.
pub struct PlaybackSession {
    user_id: Option<UserId>,
    course_id: Option<CourseId>,
    playhead: SharedPlayhead,
    sync: Option<SyncTask>,
}

impl PlaybackSession {
    #[must_use]
    pub fn new(user_id: Option<UserId>, course_id: Option<CourseId>) -> Self {
        Self {
            user_id,
            course_id,
            playhead: SharedPlayhead::new(),
            sync: None,
        }
    }

    #[must_use]
    pub fn playhead(&self) -> SharedPlayhead {
        self.playhead.clone()
    }

    #[must_use]
    pub fn course_id(&self) -> Option<CourseId> {
        self.course_id
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.sync.is_some()
    }

    /// Starts the periodic sampler, replacing any previous one.
    ///
    /// Sessions without a user or without a course play unsynced; for
    /// those this does nothing. `saved` seeds the engine so the write
    /// machinery starts from the progress the player resumed at.
    pub fn start_sync(
        &mut self,
        enrollments: Arc<dyn EnrollmentRepository>,
        saved: Option<Progress>,
        period: Duration,
    ) {
        self.stop_sync();
        let engine = ProgressSyncEngine::new(enrollments, self.user_id, self.course_id, saved);
        if !engine.is_armed() {
            tracing::debug!("playback has no user or course, progress sync stays off");
            return;
        }
        self.sync = Some(SyncTask::spawn(engine, self.playhead.clone(), period));
    }

    /// Aborts the sampler if one is running.
    pub fn stop_sync(&mut self) {
        if let Some(task) = self.sync.take() {
            task.cancel();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop_sync();
    }
}
