use crate::action::Action;
use crate::client::ActionClient;
use crate::error::{ActionError, DomainError, Rejection};
use crate::scope::{ActionScope, Scope};
use airsoft_auth::SessionResolver;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure of a dispatched action, as seen by the transport layer.
#[derive(Debug, Error)]
pub enum ActionFailure {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Object-safe view of a registered action.
#[async_trait]
pub trait DynAction: Send + Sync {
    fn name(&self) -> &'static str;

    fn scope(&self) -> ActionScope;

    async fn invoke(
        &self,
        client: &ActionClient,
        session: &SessionResolver,
        raw: Value,
    ) -> Result<Value, ActionFailure>;
}

/// An action bound to the middleware; the only form the registry stores.
pub struct SafeAction<A> {
    action: A,
}

#[async_trait]
impl<A> DynAction for SafeAction<A>
where
    A: Action,
    A::Error: Into<DomainError>,
{
    fn name(&self) -> &'static str {
        A::NAME
    }

    fn scope(&self) -> ActionScope {
        <A::Scope as Scope>::KIND
    }

    async fn invoke(
        &self,
        client: &ActionClient,
        session: &SessionResolver,
        raw: Value,
    ) -> Result<Value, ActionFailure> {
        match client.run(&self.action, session, raw).await {
            Ok(output) => Ok(serde_json::to_value(output).map_err(DomainError::from)?),
            Err(ActionError::Rejected(rejection)) => Err(rejection.into()),
            Err(ActionError::Handler(e)) => Err(ActionFailure::Domain(e.into())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub scope: ActionScope,
}

/// Name-indexed set of actions sharing one [`ActionClient`].
pub struct ActionRegistry {
    client: ActionClient,
    actions: BTreeMap<&'static str, Arc<dyn DynAction>>,
}

impl ActionRegistry {
    pub fn new(client: ActionClient) -> Self {
        Self {
            client,
            actions: BTreeMap::new(),
        }
    }

    pub fn register<A>(&mut self, action: A) -> &mut Self
    where
        A: Action,
        A::Error: Into<DomainError>,
    {
        let previous = self
            .actions
            .insert(A::NAME, Arc::new(SafeAction { action }));
        if previous.is_some() {
            tracing::warn!("Action {} registered twice, keeping the latest", A::NAME);
        }
        self
    }

    pub fn descriptors(&self) -> Vec<ActionDescriptor> {
        self.actions
            .values()
            .map(|a| ActionDescriptor {
                name: a.name(),
                scope: a.scope(),
            })
            .collect()
    }

    /// Run the named action through the middleware
    pub async fn dispatch(
        &self,
        name: &str,
        session: &SessionResolver,
        raw: Value,
    ) -> Result<Value, ActionFailure> {
        let action = self
            .actions
            .get(name)
            .ok_or_else(|| ActionFailure::UnknownAction(name.to_string()))?;

        action.invoke(&self.client, session, raw).await
    }
}
