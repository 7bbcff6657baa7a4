use crate::error::{DatabaseError, Result};
use airsoft_models::{ClubMembership, Invitation, NewInvitation};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, invitation: &NewInvitation) -> Result<Invitation> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations (club_id, email, role, token_hash, invited_by, expires_at)
            VALUES ($1, LOWER($2), $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(invitation.club_id)
        .bind(&invitation.email)
        .bind(invitation.role)
        .bind(&invitation.token_hash)
        .bind(invitation.invited_by)
        .bind(invitation.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(invitation)
    }

    pub async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Invitation>> {
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    /// Withdraw unaccepted invitations for an email so a fresh one replaces them
    pub async fn revoke_pending(&self, club_id: Uuid, email: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE club_id = $1 AND email = LOWER($2) AND accepted_at IS NULL
            "#,
        )
        .bind(club_id)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Mark the invitation accepted and create the membership in one transaction
    pub async fn accept(&self, invitation: &Invitation, user_id: Uuid) -> Result<ClubMembership> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE invitations SET accepted_at = NOW() WHERE id = $1 AND accepted_at IS NULL",
        )
        .bind(invitation.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Pending invitation", &invitation.id.to_string()));
        }

        let member = sqlx::query_as::<_, ClubMembership>(
            r#"
            INSERT INTO club_members (club_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(invitation.club_id)
        .bind(user_id)
        .bind(invitation.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if DatabaseError::is_unique_violation(&e) {
                DatabaseError::duplicate("Membership", "this user")
            } else {
                DatabaseError::from(e)
            }
        })?;

        tx.commit().await?;

        Ok(member)
    }
}
