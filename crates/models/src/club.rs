use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    /// Lowercase letters, digits and single hyphens, e.g. `black-forest-airsoft`
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Airsoft club (the tenant unit)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Club {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,

    // Home field, shown on the club map
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub website: Option<String>,
    pub instagram: Option<String>,

    /// Private clubs only show events to their members
    pub is_private: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `club.create`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubInput {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 3, max = 63), regex(path = *SLUG_REGEX))]
    pub slug: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub instagram: Option<String>,

    #[serde(default)]
    pub is_private: bool,
}

/// Input for `club.update`; absent fields are left unchanged.
///
/// An explicit `null` is read as absent, so optional fields cannot be
/// cleared through an update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubInput {
    pub club_id: Uuid,

    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(min = 1, max = 30))]
    pub instagram: Option<String>,

    pub is_private: Option<bool>,
}

/// Input for `club.delete`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteClubInput {
    pub club_id: Uuid,
}
