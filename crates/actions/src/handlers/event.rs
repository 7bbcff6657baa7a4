use crate::action::Action;
use crate::context::OperationContext;
use crate::error::{DomainError, DomainResult};
use crate::scope::{ClubScoped, Global};
use airsoft_database::{ClubRepository, Database, EventRepository, MembershipRepository};
use airsoft_models::{
    AttendEventInput, AttendanceStatus, CancelEventInput, CreateEventInput, Event,
    EventAttendance, NewEvent, UpdateEventInput,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Resolve an event id inside the authorized club. Events of other clubs
/// are reported as missing rather than forbidden.
async fn find_club_event(events: &EventRepository, club_id: Uuid, event_id: Uuid) -> DomainResult<Event> {
    events
        .find(event_id)
        .await?
        .filter(|event| event.club_id == club_id)
        .ok_or_else(|| DomainError::NotFound("Event".to_string()))
}

/// Partial updates may move only one end of the window
pub(crate) fn check_updated_window(event: &Event, input: &UpdateEventInput) -> DomainResult<()> {
    let starts_at = input.starts_at.unwrap_or(event.starts_at);
    let ends_at = input.ends_at.unwrap_or(event.ends_at);
    if ends_at <= starts_at {
        return Err(DomainError::Validation("Event must end after it starts".to_string()));
    }
    Ok(())
}

pub(crate) fn check_attendance(
    event: &Event,
    status: AttendanceStatus,
    going: i64,
    now: DateTime<Utc>,
) -> DomainResult<()> {
    if event.is_cancelled() {
        return Err(DomainError::Conflict("Event has been cancelled".to_string()));
    }
    if event.ends_at <= now {
        return Err(DomainError::Conflict("Event is already over".to_string()));
    }
    if status == AttendanceStatus::Going {
        if let Some(capacity) = event.capacity {
            if going >= i64::from(capacity) {
                return Err(DomainError::Conflict("Event is full".to_string()));
            }
        }
    }
    Ok(())
}

/// `event.create`
pub struct CreateEvent {
    events: EventRepository,
}

impl CreateEvent {
    pub fn new(db: &Database) -> Self {
        Self {
            events: EventRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for CreateEvent {
    const NAME: &'static str = "event.create";
    type Scope = ClubScoped;
    type Input = CreateEventInput;
    type Output = Event;
    type Error = DomainError;

    async fn execute(&self, input: CreateEventInput, ctx: OperationContext<ClubScoped>) -> DomainResult<Event> {
        let event = self
            .events
            .create(&NewEvent {
                club_id: ctx.club().id,
                title: input.title,
                description: input.description,
                location: input.location,
                starts_at: input.starts_at,
                ends_at: input.ends_at,
                capacity: input.capacity,
                created_by: ctx.caller().id,
            })
            .await?;

        tracing::info!("Event {} created in club {} by {}", event.id, event.club_id, ctx.caller().id);
        Ok(event)
    }
}

/// `event.update`
pub struct UpdateEvent {
    events: EventRepository,
}

impl UpdateEvent {
    pub fn new(db: &Database) -> Self {
        Self {
            events: EventRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for UpdateEvent {
    const NAME: &'static str = "event.update";
    type Scope = ClubScoped;
    type Input = UpdateEventInput;
    type Output = Event;
    type Error = DomainError;

    async fn execute(&self, input: UpdateEventInput, ctx: OperationContext<ClubScoped>) -> DomainResult<Event> {
        let event = find_club_event(&self.events, ctx.club().id, input.event_id).await?;
        if event.is_cancelled() {
            return Err(DomainError::Conflict("Event has been cancelled".to_string()));
        }
        check_updated_window(&event, &input)?;

        let event = self.events.update(event.id, &input).await?;
        tracing::info!("Event {} updated by {}", event.id, ctx.caller().id);
        Ok(event)
    }
}

/// `event.cancel`: cancelling twice keeps the first timestamp.
pub struct CancelEvent {
    events: EventRepository,
}

impl CancelEvent {
    pub fn new(db: &Database) -> Self {
        Self {
            events: EventRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for CancelEvent {
    const NAME: &'static str = "event.cancel";
    type Scope = ClubScoped;
    type Input = CancelEventInput;
    type Output = Event;
    type Error = DomainError;

    async fn execute(&self, input: CancelEventInput, ctx: OperationContext<ClubScoped>) -> DomainResult<Event> {
        let event = find_club_event(&self.events, ctx.club().id, input.event_id).await?;
        let event = self.events.cancel(event.id).await?;
        tracing::info!("Event {} cancelled by {}", event.id, ctx.caller().id);
        Ok(event)
    }
}

/// `event.attend`: any signed-in player may answer for a public club's
/// event; private clubs restrict this to their members.
pub struct AttendEvent {
    events: EventRepository,
    clubs: ClubRepository,
    memberships: MembershipRepository,
}

impl AttendEvent {
    pub fn new(db: &Database) -> Self {
        Self {
            events: EventRepository::new(db.pool().clone()),
            clubs: ClubRepository::new(db.pool().clone()),
            memberships: MembershipRepository::new(db.pool().clone()),
        }
    }
}

#[async_trait]
impl Action for AttendEvent {
    const NAME: &'static str = "event.attend";
    type Scope = Global;
    type Input = AttendEventInput;
    type Output = EventAttendance;
    type Error = DomainError;

    async fn execute(
        &self,
        input: AttendEventInput,
        ctx: OperationContext<Global>,
    ) -> DomainResult<EventAttendance> {
        let caller = ctx.caller();
        // The event row stays locked until commit so the capacity check and
        // the write see the same attendee count
        let mut lock = self
            .events
            .lock_for_attendance(input.event_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Event".to_string()))?;

        let club = self.clubs.find_by_id(lock.event().club_id).await?;
        if club.is_private && !caller.is_admin {
            let member = self.memberships.get(club.id, caller.id).await?;
            if member.is_none() {
                return Err(DomainError::Forbidden(
                    "Only members can attend this club's events".to_string(),
                ));
            }
        }

        let going = match (input.status, lock.event().capacity) {
            (AttendanceStatus::Going, Some(_)) => lock.count_going(caller.id).await?,
            _ => 0,
        };
        check_attendance(lock.event(), input.status, going, Utc::now())?;

        let attendance = lock.upsert_attendance(caller.id, input.status).await?;
        lock.commit().await?;

        tracing::debug!("User {} is {:?} for event {}", caller.id, attendance.status, attendance.event_id);
        Ok(attendance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures;
    use chrono::Duration;

    fn event(capacity: Option<i32>) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            title: "Night op".to_string(),
            description: None,
            location: Some("Quarry".to_string()),
            starts_at: now + Duration::days(2),
            ends_at: now + Duration::days(2) + Duration::hours(8),
            capacity,
            created_by: Uuid::new_v4(),
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(event: &Event) -> UpdateEventInput {
        UpdateEventInput {
            club_id: event.club_id,
            event_id: event.id,
            title: None,
            description: None,
            location: None,
            starts_at: None,
            ends_at: None,
            capacity: None,
        }
    }

    #[test]
    fn test_partial_window_update() {
        let stored = event(None);

        let later_end = UpdateEventInput {
            ends_at: Some(stored.ends_at + Duration::hours(1)),
            ..update(&stored)
        };
        assert!(check_updated_window(&stored, &later_end).is_ok());

        // Moving only the start past the stored end is rejected
        let start_after_end = UpdateEventInput {
            starts_at: Some(stored.ends_at + Duration::hours(1)),
            ..update(&stored)
        };
        assert!(matches!(
            check_updated_window(&stored, &start_after_end),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_capacity() {
        let now = Utc::now();
        let limited = event(Some(2));

        assert!(check_attendance(&limited, AttendanceStatus::Going, 1, now).is_ok());
        assert!(matches!(
            check_attendance(&limited, AttendanceStatus::Going, 2, now),
            Err(DomainError::Conflict(_))
        ));
        // Only `going` counts against capacity
        assert!(check_attendance(&limited, AttendanceStatus::Maybe, 2, now).is_ok());
        assert!(check_attendance(&event(None), AttendanceStatus::Going, 500, now).is_ok());
    }

    #[test]
    fn test_closed_events() {
        let now = Utc::now();

        let mut cancelled = event(None);
        cancelled.cancelled_at = Some(now);
        assert!(matches!(
            check_attendance(&cancelled, AttendanceStatus::Going, 0, now),
            Err(DomainError::Conflict(_))
        ));

        let finished = event(None);
        let after = finished.ends_at + Duration::minutes(1);
        assert!(matches!(
            check_attendance(&finished, AttendanceStatus::NotGoing, 0, after),
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_event_of_another_club_is_not_found() {
        let db = fixtures::database().await;
        let owner = fixtures::user(&db).await;
        let home = fixtures::club(&db, &owner, false).await;
        let rival_owner = fixtures::user(&db).await;
        let rival = fixtures::club(&db, &rival_owner, false).await;
        let rival_event = fixtures::event(&db, rival.id, &rival_owner, None).await;

        let caller = owner.with_elevated_clubs([home.id]);
        let input = CancelEventInput {
            club_id: home.id,
            event_id: rival_event.id,
        };
        let result = CancelEvent::new(&db).execute(input, OperationContext::new(caller, home)).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));

        let untouched = EventRepository::new(db.pool().clone())
            .find(rival_event.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!untouched.is_cancelled());
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_private_club_event_needs_membership() {
        let db = fixtures::database().await;
        let owner = fixtures::user(&db).await;
        let club = fixtures::club(&db, &owner, true).await;
        let event = fixtures::event(&db, club.id, &owner, None).await;
        let outsider = fixtures::user(&db).await;

        let input = AttendEventInput {
            event_id: event.id,
            status: AttendanceStatus::Going,
        };
        let result = AttendEvent::new(&db)
            .execute(input.clone(), OperationContext::new(outsider, ()))
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));

        let attendance = AttendEvent::new(&db)
            .execute(input, OperationContext::new(owner, ()))
            .await
            .unwrap();
        assert_eq!(attendance.status, AttendanceStatus::Going);
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_concurrent_attendance_respects_capacity() {
        let db = fixtures::database().await;
        let owner = fixtures::user(&db).await;
        let club = fixtures::club(&db, &owner, false).await;
        let event = fixtures::event(&db, club.id, &owner, Some(1)).await;
        let first = fixtures::user(&db).await;
        let second = fixtures::user(&db).await;

        let handler = AttendEvent::new(&db);
        let input = AttendEventInput {
            event_id: event.id,
            status: AttendanceStatus::Going,
        };
        let (a, b) = tokio::join!(
            handler.execute(input.clone(), OperationContext::new(first, ())),
            handler.execute(input, OperationContext::new(second, ())),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Err(DomainError::Conflict(_)))));
    }
}
