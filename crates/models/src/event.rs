use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Game day or other club event
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    /// Maximum number of `going` attendees, unlimited when absent
    pub capacity: Option<i32>,

    pub created_by: Uuid,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Going,
    Maybe,
    NotGoing,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventAttendance {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for `event.create`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateEventInput {
    pub club_id: Uuid,

    #[validate(length(min = 3, max = 150))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    #[validate(range(min = 1, max = 10000))]
    pub capacity: Option<i32>,
}

/// Input for `event.update`; absent or null fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_window"))]
pub struct UpdateEventInput {
    pub club_id: Uuid,
    pub event_id: Uuid,

    #[validate(length(min = 3, max = 150))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 10000))]
    pub capacity: Option<i32>,
}

/// Input for `event.cancel`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelEventInput {
    pub club_id: Uuid,
    pub event_id: Uuid,
}

/// Input for `event.attend`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendEventInput {
    pub event_id: Uuid,
    pub status: AttendanceStatus,
}

fn window_error() -> ValidationError {
    let mut err = ValidationError::new("event_window");
    err.message = Some("Event must end after it starts".into());
    err
}

fn validate_create_window(input: &CreateEventInput) -> Result<(), ValidationError> {
    if input.ends_at <= input.starts_at {
        return Err(window_error());
    }
    Ok(())
}

// Only checked when both ends are supplied; partial updates are rechecked
// against the stored event by the handler.
fn validate_update_window(input: &UpdateEventInput) -> Result<(), ValidationError> {
    if let (Some(starts_at), Some(ends_at)) = (input.starts_at, input.ends_at) {
        if ends_at <= starts_at {
            return Err(window_error());
        }
    }
    Ok(())
}
