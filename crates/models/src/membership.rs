use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Club-scoped role held by a member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClubRole {
    Owner,
    Admin,
    Member,
}

impl ClubRole {
    /// Owners and admins may mutate the club's data.
    pub fn is_elevated(self) -> bool {
        matches!(self, ClubRole::Owner | ClubRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClubRole::Owner => "owner",
            ClubRole::Admin => "admin",
            ClubRole::Member => "member",
        }
    }

    /// Roles whose holders count as elevated, as stored in the database.
    pub fn elevated_names() -> Vec<String> {
        [ClubRole::Owner, ClubRole::Admin, ClubRole::Member]
            .into_iter()
            .filter(|role| role.is_elevated())
            .map(|role| role.as_str().to_string())
            .collect()
    }
}

impl Default for ClubRole {
    fn default() -> Self {
        ClubRole::Member
    }
}

impl fmt::Display for ClubRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of a user in a club
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClubMembership {
    pub id: Uuid,
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub role: ClubRole,
    pub joined_at: DateTime<Utc>,
}

/// Input for `membership.change_role`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMemberRoleInput {
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub role: ClubRole,
}

/// Input for `membership.remove`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberInput {
    pub club_id: Uuid,
    pub user_id: Uuid,
}

/// Input for `membership.leave`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeaveClubInput {
    pub club_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevated_roles() {
        assert!(ClubRole::Owner.is_elevated());
        assert!(ClubRole::Admin.is_elevated());
        assert!(!ClubRole::Member.is_elevated());
        assert_eq!(ClubRole::elevated_names(), vec!["owner", "admin"]);
    }

    #[test]
    fn test_role_serde() {
        let role: ClubRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, ClubRole::Admin);
        assert_eq!(serde_json::to_string(&ClubRole::Owner).unwrap(), "\"owner\"");
        assert!(serde_json::from_str::<ClubRole>("\"superuser\"").is_err());
    }
}
