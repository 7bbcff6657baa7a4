use crate::action::Action;
use crate::context::OperationContext;
use crate::error::{DomainError, DomainResult};
use crate::scope::Global;
use airsoft_database::{Database, UserRepository};
use airsoft_models::{UpdateProfileInput, User};
use async_trait::async_trait;

/// `profile.update`: always targets the caller, never another user.
pub struct UpdateProfile {
    users: UserRepository,
}

impl UpdateProfile {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for UpdateProfile {
    const NAME: &'static str = "profile.update";
    type Scope = Global;
    type Input = UpdateProfileInput;
    type Output = User;
    type Error = DomainError;

    async fn execute(&self, input: UpdateProfileInput, ctx: OperationContext<Global>) -> DomainResult<User> {
        if input.is_empty() {
            return Err(DomainError::Validation("Nothing to update".to_string()));
        }

        let user = self.users.update_profile(ctx.caller().id, &input).await?;
        tracing::info!("Profile of {} updated", user.id);
        Ok(user)
    }
}
