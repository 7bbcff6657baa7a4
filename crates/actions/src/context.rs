use crate::scope::{ClubScoped, Scope};
use airsoft_auth::Caller;
use airsoft_models::Club;

/// The validated, authorized bundle handed to an action handler.
///
/// Only the middleware can build one, so a club present here is always one
/// the caller was authorized for.
#[derive(Debug, Clone)]
pub struct OperationContext<S: Scope> {
    caller: Caller,
    tenant: S::Tenant,
}

impl<S: Scope> OperationContext<S> {
    pub(crate) fn new(caller: Caller, tenant: S::Tenant) -> Self {
        Self { caller, tenant }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }
}

impl OperationContext<ClubScoped> {
    pub fn club(&self) -> &Club {
        &self.tenant
    }
}
