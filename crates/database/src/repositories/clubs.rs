use crate::error::{DatabaseError, Result};
use airsoft_models::{Club, ClubRole, CreateClubInput, UpdateClubInput};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ClubRepository {
    pool: PgPool,
}

impl ClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a club and make `owner_id` its first owner, atomically
    pub async fn create_with_owner(&self, input: &CreateClubInput, owner_id: Uuid) -> Result<Club> {
        let mut tx = self.pool.begin().await?;

        let club = sqlx::query_as::<_, Club>(
            r#"
            INSERT INTO clubs (slug, name, description, location, latitude, longitude, website, instagram, is_private)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.website)
        .bind(&input.instagram)
        .bind(input.is_private)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if DatabaseError::is_unique_violation(&e) {
                DatabaseError::duplicate("Club", "this slug")
            } else {
                DatabaseError::from(e)
            }
        })?;

        sqlx::query("INSERT INTO club_members (club_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(club.id)
            .bind(owner_id)
            .bind(ClubRole::Owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(club)
    }

    /// Look up a club, `None` when it does not exist
    pub async fn find(&self, id: Uuid) -> Result<Option<Club>> {
        let club = sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(club)
    }

    /// Find club by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Club> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Club", &id.to_string()))
    }

    /// Partial update; absent or null fields keep their stored value, so
    /// optional fields cannot be cleared this way
    pub async fn update(&self, id: Uuid, input: &UpdateClubInput) -> Result<Club> {
        let club = sqlx::query_as::<_, Club>(
            r#"
            UPDATE clubs
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                website = COALESCE($7, website),
                instagram = COALESCE($8, instagram),
                is_private = COALESCE($9, is_private),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.website)
        .bind(&input.instagram)
        .bind(input.is_private)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Club", &id.to_string()))?;

        Ok(club)
    }

    /// Delete a club; memberships, invitations and events cascade
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
