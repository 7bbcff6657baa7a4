use super::has_owner_authority;
use crate::action::Action;
use crate::context::OperationContext;
use crate::error::{DomainError, DomainResult};
use crate::scope::{ClubScoped, Global};
use airsoft_database::{ClubRepository, Database, MembershipRepository};
use airsoft_models::{Club, CreateClubInput, DeleteClubInput, UpdateClubInput};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// `club.create`: any signed-in user may found a club and becomes its owner.
pub struct CreateClub {
    clubs: ClubRepository,
}

impl CreateClub {
    pub fn new(db: &Database) -> Self {
        Self {
            clubs: ClubRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for CreateClub {
    const NAME: &'static str = "club.create";
    type Scope = Global;
    type Input = CreateClubInput;
    type Output = Club;
    type Error = DomainError;

    async fn execute(&self, input: CreateClubInput, ctx: OperationContext<Global>) -> DomainResult<Club> {
        let club = self.clubs.create_with_owner(&input, ctx.caller().id).await?;
        tracing::info!("Club {} ({}) created by {}", club.slug, club.id, ctx.caller().id);
        Ok(club)
    }
}

/// `club.update`
pub struct UpdateClub {
    clubs: ClubRepository,
}

impl UpdateClub {
    pub fn new(db: &Database) -> Self {
        Self {
            clubs: ClubRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for UpdateClub {
    const NAME: &'static str = "club.update";
    type Scope = ClubScoped;
    type Input = UpdateClubInput;
    type Output = Club;
    type Error = DomainError;

    async fn execute(&self, input: UpdateClubInput, ctx: OperationContext<ClubScoped>) -> DomainResult<Club> {
        let club = self.clubs.update(ctx.club().id, &input).await?;
        tracing::info!("Club {} updated by {}", club.id, ctx.caller().id);
        Ok(club)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDeleted {
    pub club_id: Uuid,
}

/// `club.delete`: admins of the club are not enough, owner authority is required.
pub struct DeleteClub {
    clubs: ClubRepository,
    memberships: MembershipRepository,
}

impl DeleteClub {
    pub fn new(db: &Database) -> Self {
        Self {
            clubs: ClubRepository::new(db.pool().clone()),
            memberships: MembershipRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for DeleteClub {
    const NAME: &'static str = "club.delete";
    type Scope = ClubScoped;
    type Input = DeleteClubInput;
    type Output = ClubDeleted;
    type Error = DomainError;

    async fn execute(&self, _input: DeleteClubInput, ctx: OperationContext<ClubScoped>) -> DomainResult<ClubDeleted> {
        let club_id = ctx.club().id;

        if !has_owner_authority(&self.memberships, club_id, ctx.caller()).await? {
            return Err(DomainError::Forbidden("Only club owners can delete a club".to_string()));
        }

        if !self.clubs.delete(club_id).await? {
            return Err(DomainError::NotFound("Club".to_string()));
        }

        tracing::info!("Club {} deleted by {}", club_id, ctx.caller().id);
        Ok(ClubDeleted { club_id })
    }
}
