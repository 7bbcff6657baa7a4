use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,

    // Preferred UI locale, one of `SUPPORTED_LOCALES`
    pub locale: String,

    // Global administrator (bypasses club-scoped checks)
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `profile.update`. Always applies to the calling user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub nickname: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "crate::locale::validate_locale"))]
    pub locale: Option<String>,
}

impl UpdateProfileInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.nickname.is_none()
            && self.avatar_url.is_none()
            && self.locale.is_none()
    }
}
