use super::{has_owner_authority, owner_authority};
use crate::action::Action;
use crate::context::OperationContext;
use crate::error::{DomainError, DomainResult};
use crate::scope::{ClubScoped, Global};
use airsoft_auth::{generate_token, hash_token};
use airsoft_database::{Database, DatabaseError, InvitationRepository, MembershipRepository};
use airsoft_models::{
    AcceptInvitationInput, ChangeMemberRoleInput, ClubMembership, ClubRole, Invitation,
    InviteMemberInput, LeaveClubInput, NewInvitation, RemoveMemberInput,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

fn last_owner() -> DomainError {
    DomainError::Conflict("A club must keep at least one owner".to_string())
}

/// Owners join by promotion only; admins may only be invited by owners.
pub(crate) fn check_invite_role(role: ClubRole, owner_authority: bool) -> DomainResult<()> {
    match role {
        ClubRole::Owner => Err(DomainError::Validation(
            "Owners cannot be invited, promote an existing member instead".to_string(),
        )),
        ClubRole::Admin if !owner_authority => Err(DomainError::Forbidden(
            "Only club owners can invite admins".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn check_invitation(
    invitation: &Invitation,
    caller_email: &str,
    now: DateTime<Utc>,
) -> DomainResult<()> {
    if invitation.is_accepted() {
        return Err(DomainError::Conflict("Invitation has already been used".to_string()));
    }
    if invitation.is_expired(now) {
        return Err(DomainError::Conflict("Invitation has expired".to_string()));
    }
    if !invitation.email.eq_ignore_ascii_case(caller_email) {
        return Err(DomainError::Forbidden(
            "This invitation was sent to a different email address".to_string(),
        ));
    }
    Ok(())
}

/// Granting or revoking an elevated role (owner or admin) needs owner
/// authority; club admins only manage plain members.
pub(crate) fn check_role_change(
    current: ClubRole,
    new_role: ClubRole,
    owner_authority: bool,
    owner_count: i64,
) -> DomainResult<()> {
    if (current.is_elevated() || new_role.is_elevated()) && !owner_authority {
        return Err(DomainError::Forbidden(
            "Only club owners can grant or revoke owner and admin roles".to_string(),
        ));
    }
    if current == ClubRole::Owner && new_role != ClubRole::Owner && owner_count <= 1 {
        return Err(last_owner());
    }
    Ok(())
}

pub(crate) fn check_removal(target: ClubRole, owner_authority: bool, owner_count: i64) -> DomainResult<()> {
    if !target.is_elevated() {
        return Ok(());
    }
    if !owner_authority {
        return Err(DomainError::Forbidden(
            "Only club owners can remove owners and admins".to_string(),
        ));
    }
    if target == ClubRole::Owner && owner_count <= 1 {
        return Err(last_owner());
    }
    Ok(())
}

pub(crate) fn check_leave(role: ClubRole, owner_count: i64) -> DomainResult<()> {
    if role == ClubRole::Owner && owner_count <= 1 {
        return Err(last_owner());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct InvitationCreated {
    pub invitation: Invitation,
    /// Raw token for the invitation link; only its hash is stored
    pub token: String,
}

/// `membership.invite`
pub struct InviteMember {
    invitations: InvitationRepository,
    memberships: MembershipRepository,
    ttl: Duration,
}

impl InviteMember {
    pub fn new(db: &Database, ttl: Duration) -> Self {
        Self {
            invitations: InvitationRepository::new(db.pool().clone()),
            memberships: MembershipRepository::new(db.pool().clone()),
            ttl,
        }
    }
}

#[async_trait]
impl Action for InviteMember {
    const NAME: &'static str = "membership.invite";
    type Scope = ClubScoped;
    type Input = InviteMemberInput;
    type Output = InvitationCreated;
    type Error = DomainError;

    async fn execute(
        &self,
        input: InviteMemberInput,
        ctx: OperationContext<ClubScoped>,
    ) -> DomainResult<InvitationCreated> {
        let club_id = ctx.club().id;
        let owner_authority = has_owner_authority(&self.memberships, club_id, ctx.caller()).await?;
        check_invite_role(input.role, owner_authority)?;

        if self.memberships.has_member_with_email(club_id, &input.email).await? {
            return Err(DomainError::Conflict(
                "This person is already a member of the club".to_string(),
            ));
        }

        let revoked = self.invitations.revoke_pending(club_id, &input.email).await?;
        if revoked > 0 {
            tracing::debug!("Replaced {} pending invitation(s) for club {}", revoked, club_id);
        }

        let token = generate_token();
        let invitation = self
            .invitations
            .create(&NewInvitation {
                club_id,
                email: input.email,
                role: input.role,
                token_hash: hash_token(&token),
                invited_by: ctx.caller().id,
                expires_at: Utc::now() + self.ttl,
            })
            .await?;

        tracing::info!(
            "Invitation {} to club {} created by {} (role {})",
            invitation.id,
            club_id,
            ctx.caller().id,
            invitation.role
        );

        Ok(InvitationCreated { invitation, token })
    }
}

/// `membership.accept`: global, the invitation itself names the club and the
/// handler checks that it was addressed to the caller.
pub struct AcceptInvitation {
    invitations: InvitationRepository,
}

impl AcceptInvitation {
    pub fn new(db: &Database) -> Self {
        Self {
            invitations: InvitationRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for AcceptInvitation {
    const NAME: &'static str = "membership.accept";
    type Scope = Global;
    type Input = AcceptInvitationInput;
    type Output = ClubMembership;
    type Error = DomainError;

    async fn execute(
        &self,
        input: AcceptInvitationInput,
        ctx: OperationContext<Global>,
    ) -> DomainResult<ClubMembership> {
        let invitation = self
            .invitations
            .find_by_token_hash(&hash_token(&input.token))
            .await?
            .ok_or_else(|| DomainError::NotFound("Invitation".to_string()))?;

        check_invitation(&invitation, &ctx.caller().email, Utc::now())?;

        let member = self.invitations.accept(&invitation, ctx.caller().id).await?;
        tracing::info!("User {} joined club {} as {}", member.user_id, member.club_id, member.role);
        Ok(member)
    }
}

/// `membership.change_role`
pub struct ChangeMemberRole {
    memberships: MembershipRepository,
}

impl ChangeMemberRole {
    pub fn new(db: &Database) -> Self {
        Self {
            memberships: MembershipRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for ChangeMemberRole {
    const NAME: &'static str = "membership.change_role";
    type Scope = ClubScoped;
    type Input = ChangeMemberRoleInput;
    type Output = ClubMembership;
    type Error = DomainError;

    async fn execute(
        &self,
        input: ChangeMemberRoleInput,
        ctx: OperationContext<ClubScoped>,
    ) -> DomainResult<ClubMembership> {
        let club_id = ctx.club().id;
        // Held until commit; concurrent role changes in this club queue here
        let mut lock = self.memberships.lock_club(club_id).await?;

        let target = lock
            .get(input.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;
        let own = lock.get(ctx.caller().id).await?;
        let owner_count = lock.count_owners().await?;
        check_role_change(
            target.role,
            input.role,
            owner_authority(ctx.caller(), own.as_ref()),
            owner_count,
        )?;

        let member = lock.update_role(input.user_id, input.role).await?;
        lock.commit().await?;

        tracing::info!(
            "Role of {} in club {} changed {} -> {} by {}",
            member.user_id,
            club_id,
            target.role,
            member.role,
            ctx.caller().id
        );
        Ok(member)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipEnded {
    pub club_id: Uuid,
    pub user_id: Uuid,
}

/// `membership.remove`
pub struct RemoveMember {
    memberships: MembershipRepository,
}

impl RemoveMember {
    pub fn new(db: &Database) -> Self {
        Self {
            memberships: MembershipRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for RemoveMember {
    const NAME: &'static str = "membership.remove";
    type Scope = ClubScoped;
    type Input = RemoveMemberInput;
    type Output = MembershipEnded;
    type Error = DomainError;

    async fn execute(
        &self,
        input: RemoveMemberInput,
        ctx: OperationContext<ClubScoped>,
    ) -> DomainResult<MembershipEnded> {
        let club_id = ctx.club().id;
        let mut lock = self.memberships.lock_club(club_id).await?;

        let target = lock
            .get(input.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;
        let own = lock.get(ctx.caller().id).await?;
        let owner_count = lock.count_owners().await?;
        check_removal(target.role, owner_authority(ctx.caller(), own.as_ref()), owner_count)?;

        lock.remove(input.user_id).await?;
        lock.commit().await?;
        tracing::info!("User {} removed from club {} by {}", input.user_id, club_id, ctx.caller().id);

        Ok(MembershipEnded {
            club_id,
            user_id: input.user_id,
        })
    }
}

/// `membership.leave`: global, membership of the caller is checked here.
pub struct LeaveClub {
    memberships: MembershipRepository,
}

impl LeaveClub {
    pub fn new(db: &Database) -> Self {
        Self {
            memberships: MembershipRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for LeaveClub {
    const NAME: &'static str = "membership.leave";
    type Scope = Global;
    type Input = LeaveClubInput;
    type Output = MembershipEnded;
    type Error = DomainError;

    async fn execute(&self, input: LeaveClubInput, ctx: OperationContext<Global>) -> DomainResult<MembershipEnded> {
        let user_id = ctx.caller().id;
        let mut lock = self.memberships.lock_club(input.club_id).await.map_err(|err| match err {
            // Same answer as an existing club the caller never joined
            DatabaseError::NotFound(_) => DomainError::NotFound("Membership".to_string()),
            other => other.into(),
        })?;

        let membership = lock
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;
        let owner_count = lock.count_owners().await?;
        check_leave(membership.role, owner_count)?;

        lock.remove(user_id).await?;
        lock.commit().await?;
        tracing::info!("User {} left club {}", user_id, input.club_id);

        Ok(MembershipEnded {
            club_id: input.club_id,
            user_id,
        })
    }
}
