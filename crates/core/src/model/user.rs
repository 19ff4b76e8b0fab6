use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email address cannot be empty")]
    EmptyEmail,

    #[error("email address is not valid")]
    InvalidEmail,
}

//
// ─── AUTH USER ─────────────────────────────────────────────────────────────────
//

/// The signed-in identity the auth collaborator hands us.
///
/// Only the id participates in enrollment; email and display name are for
/// the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    id: UserId,
    email: String,
    name: Option<String>,
}

impl AuthUser {
    /// Creates a new `AuthUser`.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyEmail` for a blank email and
    /// `UserError::InvalidEmail` when it has no `@`. Full address validation
    /// belongs to the auth provider; this only catches obviously broken input.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: Option<String>,
    ) -> Result<Self, UserError> {
        let email = email.into();
        let email = email.trim().to_owned();
        if email.is_empty() {
            return Err(UserError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(UserError::InvalidEmail);
        }

        let name = name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());

        Ok(Self { id, email, name })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// What the UI greets the user as: the name when present, otherwise the
    /// part of the email before the `@`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref() {
            return name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_new_rejects_empty_email() {
        let err = AuthUser::new(UserId::generate(), "   ", None).unwrap_err();
        assert_eq!(err, UserError::EmptyEmail);
    }

    #[test]
    fn user_new_rejects_email_without_at() {
        let err = AuthUser::new(UserId::generate(), "nobody.example.com", None).unwrap_err();
        assert_eq!(err, UserError::InvalidEmail);
    }

    #[test]
    fn user_new_trims_and_filters_name() {
        let user = AuthUser::new(
            UserId::generate(),
            "ada@example.com",
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(user.name(), None);
    }

    #[test]
    fn display_name_prefers_name() {
        let user = AuthUser::new(UserId::generate(), "ada@example.com", Some("Ada".into()))
            .unwrap();
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let user = AuthUser::new(UserId::generate(), "ada@example.com", None).unwrap();
        assert_eq!(user.display_name(), "ada");
    }
}
