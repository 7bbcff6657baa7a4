//! Authorization middleware and domain actions.
//!
//! Every state-changing operation is an [`Action`]. Actions are executed by
//! the [`ActionClient`], which resolves the caller, authorizes the club for
//! club-scoped actions and validates the input before the handler body runs.
//! The [`ActionRegistry`] exposes them by name to the transport layer.

pub mod action;
pub mod client;
pub mod context;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod scope;
pub mod store;

pub use action::Action;
pub use client::ActionClient;
pub use context::OperationContext;
pub use error::{ActionError, DomainError, DomainResult, Rejection};
pub use handlers::{register_all, HandlerSettings};
pub use registry::{ActionDescriptor, ActionFailure, ActionRegistry, DynAction, SafeAction};
pub use scope::{ActionScope, ClubScoped, Global, Scope, CLUB_ID_FIELD};
pub use store::ClubStore;
