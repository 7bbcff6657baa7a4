// Core records
pub mod user;
pub mod session;
pub mod club;
pub mod membership;
pub mod invitation;
pub mod event;

// Locale negotiation for user-facing messages
pub mod locale;

// Re-export commonly used types
pub use user::{User, UpdateProfileInput};
pub use session::Session;
pub use club::{Club, CreateClubInput, UpdateClubInput, DeleteClubInput};
pub use membership::{
    ClubMembership, ClubRole, ChangeMemberRoleInput, RemoveMemberInput,
    LeaveClubInput,
};
pub use invitation::{Invitation, NewInvitation, InviteMemberInput, AcceptInvitationInput};
pub use event::{
    Event, NewEvent, EventAttendance, AttendanceStatus, CreateEventInput, UpdateEventInput,
    CancelEventInput, AttendEventInput,
};
pub use locale::{resolve_locale, DEFAULT_LOCALE, SUPPORTED_LOCALES};
