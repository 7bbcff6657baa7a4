pub mod connection;
pub mod error;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use repositories::{
    clubs::ClubRepository,
    events::{EventAttendanceLock, EventRepository},
    invitations::InvitationRepository,
    memberships::{ClubMembershipsLock, MembershipRepository},
    sessions::SessionRepository,
    users::UserRepository,
};
