use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// The authenticated identity attempting an operation.
///
/// Rebuilt from session state on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
    /// Stored locale preference, when known
    pub locale: Option<String>,
    /// Clubs where the caller is an owner or admin
    pub elevated_clubs: HashSet<Uuid>,
}

impl Caller {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            is_admin: false,
            locale: None,
            elevated_clubs: HashSet::new(),
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_elevated_clubs(mut self, clubs: impl IntoIterator<Item = Uuid>) -> Self {
        self.elevated_clubs.extend(clubs);
        self
    }

    pub fn is_elevated_in(&self, club_id: Uuid) -> bool {
        self.elevated_clubs.contains(&club_id)
    }

    /// Global administrators may act on every club.
    pub fn can_manage(&self, club_id: Uuid) -> bool {
        self.is_admin || self.is_elevated_in(club_id)
    }
}
