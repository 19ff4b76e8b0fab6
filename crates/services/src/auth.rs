//! Sign-in state shared across the app.
//!
//! Views and services never reach into ambient globals for the current
//! user; they hold this service and either ask it directly or subscribe
//! to the watch channel to be told when the user changes.

use academy_core::model::AuthUser;
use tokio::sync::watch;

/// Owns the signed-in user, if any, and broadcasts changes.
pub struct SessionService {
    current: watch::Sender<Option<AuthUser>>,
}

impl SessionService {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    /// Snapshot of the signed-in user.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Replaces the signed-in user and notifies subscribers.
    pub fn sign_in(&self, user: AuthUser) {
        self.current.send_replace(Some(user));
    }

    /// Clears the signed-in user and notifies subscribers.
    pub fn sign_out(&self) {
        self.current.send_replace(None);
    }

    /// A receiver that yields whenever the signed-in user changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::UserId;

    fn user(email: &str) -> AuthUser {
        AuthUser::new(UserId::generate(), email, None).unwrap()
    }

    #[test]
    fn starts_signed_out() {
        let session = SessionService::new();
        assert!(!session.is_signed_in());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn sign_in_then_out_round_trips() {
        let session = SessionService::new();
        session.sign_in(user("amir@example.com"));
        assert!(session.is_signed_in());
        assert_eq!(
            session.current_user().map(|u| u.email().to_owned()),
            Some("amir@example.com".to_owned())
        );

        session.sign_out();
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let session = SessionService::new();
        let mut rx = session.subscribe();

        session.sign_in(user("amir@example.com"));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        session.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
