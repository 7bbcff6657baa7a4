//! Domain actions. Every mutating entry point of the application lives here
//! and is registered through [`register_all`].

pub mod club;
pub mod event;
pub mod membership;
pub mod profile;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::DomainResult;
use crate::registry::ActionRegistry;
use airsoft_auth::Caller;
use airsoft_database::{Database, MembershipRepository};
use airsoft_models::{ClubMembership, ClubRole};
use uuid::Uuid;

pub use club::{CreateClub, DeleteClub, UpdateClub};
pub use event::{AttendEvent, CancelEvent, CreateEvent, UpdateEvent};
pub use membership::{
    AcceptInvitation, ChangeMemberRole, InvitationCreated, InviteMember, LeaveClub, RemoveMember,
};
pub use profile::UpdateProfile;

#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// How long an invitation token stays valid
    pub invitation_ttl: chrono::Duration,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            invitation_ttl: chrono::Duration::days(7),
        }
    }
}

impl HandlerSettings {
    pub fn from_env() -> Self {
        let days = std::env::var("INVITATION_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|d: &i64| *d > 0)
            .unwrap_or(7);
        Self {
            invitation_ttl: chrono::Duration::days(days),
        }
    }
}

/// Register every domain action on the registry
pub fn register_all(registry: &mut ActionRegistry, db: &Database, settings: &HandlerSettings) {
    registry
        .register(CreateClub::new(db))
        .register(UpdateClub::new(db))
        .register(DeleteClub::new(db))
        .register(InviteMember::new(db, settings.invitation_ttl))
        .register(AcceptInvitation::new(db))
        .register(ChangeMemberRole::new(db))
        .register(RemoveMember::new(db))
        .register(LeaveClub::new(db))
        .register(CreateEvent::new(db))
        .register(UpdateEvent::new(db))
        .register(CancelEvent::new(db))
        .register(AttendEvent::new(db))
        .register(UpdateProfile::new(db));
}

/// Owner authority over a club: an owner membership, or a global
/// administrator.
pub(crate) fn owner_authority(caller: &Caller, membership: Option<&ClubMembership>) -> bool {
    caller.is_admin || membership.map(|m| m.role) == Some(ClubRole::Owner)
}

pub(crate) async fn has_owner_authority(
    memberships: &MembershipRepository,
    club_id: Uuid,
    caller: &Caller,
) -> DomainResult<bool> {
    if caller.is_admin {
        return Ok(true);
    }
    let membership = memberships.get(club_id, caller.id).await?;
    Ok(owner_authority(caller, membership.as_ref()))
}
