#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod player;
pub mod resume;
pub mod sync;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use auth::SessionService;
pub use catalog::{DashboardSnapshot, EnrollmentCatalog, EnrollmentStats, FEATURED_LIMIT};
pub use error::{AppServicesError, CatalogError};
pub use player::{MediaEvent, MediaTransport, PlaybackController};
pub use resume::resume_start_time;
pub use sync::{
    PlaybackSession, ProgressSyncEngine, SYNC_INTERVAL, SharedPlayhead, SyncOutcome, SyncTask,
};
