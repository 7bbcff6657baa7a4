use crate::error::{DatabaseError, Result};
use airsoft_models::{ClubMembership, ClubRole};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction holding the club row lock.
    ///
    /// Every membership change that depends on the owner count goes through
    /// the returned lock, so concurrent changes in one club are serialized.
    /// Dropping the lock without `commit` rolls back.
    pub async fn lock_club(&self, club_id: Uuid) -> Result<ClubMembershipsLock> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM clubs WHERE id = $1 FOR UPDATE")
            .bind(club_id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            return Err(DatabaseError::not_found("Club", &club_id.to_string()));
        }

        Ok(ClubMembershipsLock { tx, club_id })
    }

    /// Get a specific membership
    pub async fn get(&self, club_id: Uuid, user_id: Uuid) -> Result<Option<ClubMembership>> {
        let member = sqlx::query_as::<_, ClubMembership>(
            "SELECT * FROM club_members WHERE club_id = $1 AND user_id = $2",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Clubs in which the user holds an elevated role (owner or admin)
    pub async fn elevated_club_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT club_id FROM club_members WHERE user_id = $1 AND role = ANY($2)",
        )
        .bind(user_id)
        .bind(ClubRole::elevated_names())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Check whether a user with this email is already a member
    pub async fn has_member_with_email(&self, club_id: Uuid, email: &str) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM club_members cm
                INNER JOIN users u ON cm.user_id = u.id
                WHERE cm.club_id = $1 AND LOWER(u.email) = LOWER($2)
            )
            "#,
        )
        .bind(club_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }
}

/// Memberships of one club, read and written inside a locked transaction
pub struct ClubMembershipsLock {
    tx: Transaction<'static, Postgres>,
    club_id: Uuid,
}

impl ClubMembershipsLock {
    pub async fn get(&mut self, user_id: Uuid) -> Result<Option<ClubMembership>> {
        let member = sqlx::query_as::<_, ClubMembership>(
            "SELECT * FROM club_members WHERE club_id = $1 AND user_id = $2",
        )
        .bind(self.club_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(member)
    }

    pub async fn count_owners(&mut self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM club_members WHERE club_id = $1 AND role = $2",
        )
        .bind(self.club_id)
        .bind(ClubRole::Owner)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(count.0)
    }

    pub async fn update_role(&mut self, user_id: Uuid, role: ClubRole) -> Result<ClubMembership> {
        let member = sqlx::query_as::<_, ClubMembership>(
            r#"
            UPDATE club_members
            SET role = $3
            WHERE club_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(self.club_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Membership", &user_id.to_string()))?;

        Ok(member)
    }

    pub async fn remove(&mut self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
            .bind(self.club_id)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
