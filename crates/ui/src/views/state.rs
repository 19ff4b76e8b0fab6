use std::collections::HashSet;

use academy_core::model::{AuthUser, CourseId};
use dioxus::prelude::*;
use services::{CatalogError, EnrollmentCatalog};

use crate::context::AppContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The record store could not be reached. Distinct from an empty
    /// result, which renders as content.
    Unavailable,
    NotSignedIn,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unavailable => "We couldn't reach your courses. Please try again.",
            ViewError::NotSignedIn => "Please log in first!",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<CatalogError> for ViewError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AuthRequired => ViewError::NotSignedIn,
            CatalogError::Storage(_) => ViewError::Unavailable,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

/// Enrolled ids for card labelling. An anonymous browser simply sees
/// nothing enrolled; store failures still surface.
pub(crate) async fn enrolled_ids_or_empty(
    catalog: &EnrollmentCatalog,
) -> Result<HashSet<CourseId>, ViewError> {
    match catalog.enrolled_ids().await {
        Ok(ids) => Ok(ids),
        Err(CatalogError::AuthRequired) => Ok(HashSet::new()),
        Err(err) => Err(ViewError::from(err)),
    }
}

/// The signed-in user as a signal that follows auth changes for the
/// component's lifetime.
#[must_use]
pub fn use_current_user() -> Signal<Option<AuthUser>> {
    let ctx = use_context::<AppContext>();
    let session = ctx.session();
    let user = use_signal(|| session.current_user());
    use_hook(move || {
        let mut user = user;
        let mut rx = session.subscribe();
        spawn(async move {
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                user.set(next);
            }
        });
    });
    user
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use storage::repository::StorageError;

    use super::*;

    #[test]
    fn catalog_errors_map_to_distinct_view_errors() {
        assert_eq!(
            ViewError::from(CatalogError::AuthRequired),
            ViewError::NotSignedIn
        );
        assert_eq!(
            ViewError::from(CatalogError::Storage(StorageError::Connection(
                "down".to_owned()
            ))),
            ViewError::Unavailable
        );
    }

    #[test]
    fn messages_tell_the_states_apart() {
        assert_eq!(ViewError::NotSignedIn.message(), "Please log in first!");
        assert_ne!(
            ViewError::Unavailable.message(),
            ViewError::Unknown.message()
        );
    }
}
