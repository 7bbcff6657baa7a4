//! Caller identity for the action layer.
//!
//! A [`SessionResolver`] is created for every inbound request and memoises the
//! caller returned by a [`SessionProvider`] for the lifetime of that request.

pub mod caller;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod token;

pub use caller::Caller;
pub use error::{AuthError, Result};
pub use provider::{DatabaseSessionProvider, SessionProvider, DEFAULT_SESSION_COOKIE};
pub use resolver::SessionResolver;
pub use token::{generate_token, hash_token};
