use std::sync::Arc;
use std::time::Duration;

use academy_core::model::{CourseId, Progress};
use storage::repository::{EnrollmentRepository, Storage};
use storage::rest::RestStoreConfig;

use crate::Clock;
use crate::auth::SessionService;
use crate::catalog::EnrollmentCatalog;
use crate::error::AppServicesError;
use crate::sync::PlaybackSession;

/// Assembles app-facing services over one record store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    session: Arc<SessionService>,
    catalog: Arc<EnrollmentCatalog>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl AppServices {
    /// Wire the services over an already-built record store.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let session = Arc::new(SessionService::new());
        let catalog = Arc::new(EnrollmentCatalog::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.enrollments),
            Arc::clone(&session),
        ));
        Self {
            clock,
            session,
            catalog,
            enrollments: Arc::clone(&storage.enrollments),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or
    /// migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services backed by a hosted PostgREST-style store.
    #[must_use]
    pub fn new_rest(config: RestStoreConfig, clock: Clock) -> Self {
        Self::from_storage(&Storage::rest(config), clock)
    }

    /// Build services over the in-memory store, for tests and previews.
    #[must_use]
    pub fn new_in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    /// A playback session for the signed-in user (if any) and the given
    /// course (if known). The caller decides when syncing starts.
    #[must_use]
    pub fn begin_playback(&self, course_id: Option<CourseId>) -> PlaybackSession {
        let user_id = self.session.current_user().map(|u| u.id());
        PlaybackSession::new(user_id, course_id)
    }

    /// Starts the periodic progress sampler on `session`, seeded with the
    /// percent playback resumed from so resuming alone never rewrites it.
    pub fn start_progress_sync(
        &self,
        session: &mut PlaybackSession,
        resumed_from: Option<Progress>,
        period: Duration,
    ) {
        session.start_sync(Arc::clone(&self.enrollments), resumed_from, period);
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionService> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<EnrollmentCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        Arc::clone(&self.enrollments)
    }
}
