use crate::membership::ClubRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Pending or accepted invitation to join a club
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub club_id: Uuid,
    pub email: String,
    pub role: ClubRole,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub club_id: Uuid,
    pub email: String,
    pub role: ClubRole,
    pub token_hash: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Input for `membership.invite`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberInput {
    pub club_id: Uuid,

    #[validate(email)]
    pub email: String,

    #[serde(default)]
    pub role: ClubRole,
}

/// Input for `membership.accept`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationInput {
    #[validate(length(equal = 64))]
    pub token: String,
}
