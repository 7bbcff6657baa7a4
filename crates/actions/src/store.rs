use airsoft_database::{ClubRepository, DatabaseError};
use airsoft_models::Club;
use async_trait::async_trait;
use uuid::Uuid;

/// Club lookup used by the authorization middleware.
#[async_trait]
pub trait ClubStore: Send + Sync {
    async fn find_club(&self, id: Uuid) -> Result<Option<Club>, DatabaseError>;
}

#[async_trait]
impl ClubStore for ClubRepository {
    async fn find_club(&self, id: Uuid) -> Result<Option<Club>, DatabaseError> {
        self.find(id).await
    }
}
