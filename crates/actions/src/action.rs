use crate::context::OperationContext;
use crate::scope::Scope;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// A state-mutating operation.
///
/// Handlers declare their name, scope and input schema and are only ever
/// executed through [`crate::ActionClient`], which authenticates the caller,
/// authorizes the club and validates the input first.
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Dispatch name, e.g. `club.update`
    const NAME: &'static str;

    type Scope: Scope;
    type Input: DeserializeOwned + Validate + Send + 'static;
    type Output: Serialize + Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(
        &self,
        input: Self::Input,
        ctx: OperationContext<Self::Scope>,
    ) -> Result<Self::Output, Self::Error>;
}
