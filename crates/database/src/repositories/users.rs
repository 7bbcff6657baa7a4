use crate::error::{DatabaseError, Result};
use airsoft_models::{UpdateProfileInput, User};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", &id.to_string()))?;

        Ok(user)
    }

    /// Update the profile fields that are present in the input.
    ///
    /// `COALESCE` keeps the stored value for absent or null fields, so a
    /// partial update never clears an optional field.
    pub async fn update_profile(&self, id: Uuid, input: &UpdateProfileInput) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                nickname = COALESCE($3, nickname),
                avatar_url = COALESCE($4, avatar_url),
                locale = COALESCE($5, locale),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.nickname)
        .bind(&input.avatar_url)
        .bind(&input.locale)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", &id.to_string()))?;

        Ok(user)
    }
}
