//! Database fixtures for handler tests. Tests using them are `#[ignore]`
//! and need `DATABASE_URL`.

use airsoft_auth::Caller;
use airsoft_database::{ClubRepository, Database, DatabaseConfig, EventRepository};
use airsoft_models::{Club, ClubRole, CreateClubInput, Event, NewEvent};
use chrono::{Duration, Utc};
use uuid::Uuid;

pub(crate) async fn database() -> Database {
    let db = Database::new(DatabaseConfig::from_env()).await.unwrap();
    db.migrate().await.unwrap();
    db
}

pub(crate) async fn user(db: &Database) -> Caller {
    let email = format!("{}@example.com", Uuid::new_v4());
    let row: (Uuid,) = sqlx::query_as("INSERT INTO users (email, name) VALUES ($1, 'Test Player') RETURNING id")
        .bind(&email)
        .fetch_one(db.pool())
        .await
        .unwrap();
    Caller::new(row.0, email)
}

/// A club owned by `owner`
pub(crate) async fn club(db: &Database, owner: &Caller, is_private: bool) -> Club {
    let input = CreateClubInput {
        name: "Test Club".to_string(),
        slug: format!("club-{}", Uuid::new_v4().simple()),
        description: None,
        location: None,
        latitude: None,
        longitude: None,
        website: None,
        instagram: None,
        is_private,
    };
    ClubRepository::new(db.pool().clone())
        .create_with_owner(&input, owner.id)
        .await
        .unwrap()
}

pub(crate) async fn add_member(db: &Database, club_id: Uuid, user: &Caller, role: ClubRole) {
    sqlx::query("INSERT INTO club_members (club_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(club_id)
        .bind(user.id)
        .bind(role)
        .execute(db.pool())
        .await
        .unwrap();
}

pub(crate) async fn event(db: &Database, club_id: Uuid, created_by: &Caller, capacity: Option<i32>) -> Event {
    let starts_at = Utc::now() + Duration::days(3);
    EventRepository::new(db.pool().clone())
        .create(&NewEvent {
            club_id,
            title: "Sunday skirmish".to_string(),
            description: None,
            location: None,
            starts_at,
            ends_at: starts_at + Duration::hours(6),
            capacity,
            created_by: created_by.id,
        })
        .await
        .unwrap()
}
