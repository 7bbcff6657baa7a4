pub mod users;
pub mod sessions;
pub mod clubs;
pub mod memberships;
pub mod invitations;
pub mod events;
