//! Static tenant scoping of actions.
//!
//! Every action names its scope as an associated type. [`Global`] actions run
//! for any authenticated caller; [`ClubScoped`] actions must carry a `clubId`
//! that resolves to a club the caller manages.

use crate::error::Rejection;
use crate::store::ClubStore;
use airsoft_auth::Caller;
use airsoft_models::Club;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use uuid::Uuid;

/// Raw input field inspected before domain validation
pub const CLUB_ID_FIELD: &str = "clubId";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionScope {
    Global,
    Club,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Global {}
    impl Sealed for super::ClubScoped {}
}

#[async_trait]
pub trait Scope: sealed::Sealed + Send + Sync + 'static {
    /// What an authorized invocation carries into the handler
    type Tenant: Debug + Clone + Send + Sync;

    const KIND: ActionScope;

    async fn authorize(
        caller: &Caller,
        raw: &Value,
        clubs: &dyn ClubStore,
    ) -> Result<Self::Tenant, Rejection>;
}

/// Allowed for any authenticated caller. Handlers that touch club data check
/// access themselves.
#[derive(Debug, Clone, Copy)]
pub struct Global;

/// Requires an owner/admin role on the club named by `clubId`, or a global
/// administrator.
#[derive(Debug, Clone, Copy)]
pub struct ClubScoped;

#[async_trait]
impl Scope for Global {
    type Tenant = ();

    const KIND: ActionScope = ActionScope::Global;

    async fn authorize(_caller: &Caller, _raw: &Value, _clubs: &dyn ClubStore) -> Result<(), Rejection> {
        Ok(())
    }
}

#[async_trait]
impl Scope for ClubScoped {
    type Tenant = Club;

    const KIND: ActionScope = ActionScope::Club;

    async fn authorize(caller: &Caller, raw: &Value, clubs: &dyn ClubStore) -> Result<Club, Rejection> {
        let club_id = parse_club_id(raw)?;

        let club = match clubs.find_club(club_id).await {
            Ok(Some(club)) => club,
            Ok(None) => return Err(Rejection::NotFound("Club".to_string())),
            Err(e) => {
                tracing::error!("Club lookup failed for {}: {}", club_id, e);
                return Err(Rejection::Internal);
            }
        };

        if !caller.can_manage(club.id) {
            return Err(Rejection::Forbidden(
                "This action requires an owner or admin role in the club".to_string(),
            ));
        }

        Ok(club)
    }
}

/// Minimal schema for club-scoped input: `clubId` must be a non-empty UUID.
pub fn parse_club_id(raw: &Value) -> Result<Uuid, Rejection> {
    let invalid = || {
        Rejection::InvalidInput(format!("{} must be a non-empty club identifier", CLUB_ID_FIELD))
    };

    let value = raw
        .get(CLUB_ID_FIELD)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(invalid)?;

    Uuid::parse_str(value).map_err(|_| invalid())
}
