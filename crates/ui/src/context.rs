use std::sync::{Arc, Mutex, PoisonError};

use academy_core::model::{CourseId, Progress};
use services::{AppServices, EnrollmentCatalog, SessionService};

pub trait UiApp: Send + Sync {
    fn services(&self) -> AppServices;
}

/// Transient navigation payload for the player: which course is about to
/// play, from which source, resuming from which saved percent. Armed by
/// the view that navigates, taken once by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerLaunch {
    pub course_id: Option<CourseId>,
    pub title: String,
    pub video_url: String,
    pub saved_progress: Option<Progress>,
}

/// One-shot slot: a writer arms it, the first reader takes it.
struct TakeOnce<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for TakeOnce<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for TakeOnce<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> TakeOnce<T> {
    fn put(&self, value: T) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    fn take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
    catalog: Arc<EnrollmentCatalog>,
    session: Arc<SessionService>,

    player_launch: TakeOnce<PlayerLaunch>,
    pending_enroll: TakeOnce<CourseId>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let services = app.services();
        let catalog = services.catalog();
        let session = services.session();

        Self {
            services,
            catalog,
            session,
            player_launch: TakeOnce::default(),
            pending_enroll: TakeOnce::default(),
        }
    }

    #[must_use]
    pub fn services(&self) -> AppServices {
        self.services.clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<EnrollmentCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionService> {
        Arc::clone(&self.session)
    }

    /// Arms the player for the next navigation to the player route.
    pub fn launch_player(&self, launch: PlayerLaunch) {
        self.player_launch.put(launch);
    }

    #[must_use]
    pub fn take_player_launch(&self) -> Option<PlayerLaunch> {
        self.player_launch.take()
    }

    /// Remembers an enroll attempt that has to wait for a sign-in.
    pub fn defer_enroll(&self, course_id: CourseId) {
        self.pending_enroll.put(course_id);
    }

    #[must_use]
    pub fn take_pending_enroll(&self) -> Option<CourseId> {
        self.pending_enroll.take()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
