use crate::action::Action;
use crate::context::OperationContext;
use crate::error::{ActionError, Rejection};
use crate::scope::Scope;
use crate::store::ClubStore;
use airsoft_auth::SessionResolver;
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

/// Runs actions behind the authentication and club authorization checks.
///
/// Order per invocation: resolve the caller, authorize the club (club-scoped
/// actions only), validate the domain input, then execute. Any failure stops
/// the pipeline before the handler body runs.
#[derive(Clone)]
pub struct ActionClient {
    clubs: Arc<dyn ClubStore>,
}

impl ActionClient {
    pub fn new(clubs: Arc<dyn ClubStore>) -> Self {
        Self { clubs }
    }

    pub async fn run<A: Action>(
        &self,
        action: &A,
        session: &SessionResolver,
        raw: Value,
    ) -> Result<A::Output, ActionError<A::Error>> {
        let ctx = self
            .authorize::<A::Scope>(session, &raw)
            .await
            .inspect_err(|rejection| {
                tracing::warn!(
                    action = A::NAME,
                    code = rejection.code(),
                    "Action rejected: {}",
                    rejection
                );
            })?;

        let input = parse_input::<A::Input>(raw).inspect_err(|rejection| {
            tracing::warn!(action = A::NAME, code = rejection.code(), "Action input rejected");
        })?;

        let caller_id = ctx.caller().id;
        let result = action.execute(input, ctx).await;

        match &result {
            Ok(_) => tracing::info!(action = A::NAME, caller = %caller_id, "Action completed"),
            Err(e) => tracing::warn!(action = A::NAME, caller = %caller_id, "Action failed: {}", e),
        }

        result.map_err(ActionError::Handler)
    }

    async fn authorize<S: Scope>(
        &self,
        session: &SessionResolver,
        raw: &Value,
    ) -> Result<OperationContext<S>, Rejection> {
        let caller = session.resolve().await.ok_or(Rejection::Unauthenticated)?;
        let tenant = S::authorize(caller, raw, self.clubs.as_ref()).await?;
        Ok(OperationContext::new(caller.clone(), tenant))
    }
}

fn parse_input<T>(raw: Value) -> Result<T, Rejection>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let input: T =
        serde_json::from_value(raw).map_err(|e| Rejection::InvalidInput(e.to_string()))?;
    input.validate()?;
    Ok(input)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scope::{ClubScoped, Global};
    use airsoft_auth::{AuthError, Caller, SessionProvider};
    use airsoft_database::DatabaseError;
    use airsoft_models::Club;
    use async_trait::async_trait;
    use axum::http::HeaderMap;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    pub struct StaticProvider(pub Option<Caller>);

    #[async_trait]
    impl SessionProvider for StaticProvider {
        async fn fetch_caller(&self, _headers: &HeaderMap) -> airsoft_auth::Result<Option<Caller>> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SessionProvider for FailingProvider {
        async fn fetch_caller(&self, _headers: &HeaderMap) -> airsoft_auth::Result<Option<Caller>> {
            Err(AuthError::Provider("auth provider down".to_string()))
        }
    }

    #[derive(Default)]
    pub struct MemoryClubStore {
        pub clubs: HashMap<Uuid, Club>,
        pub lookups: AtomicUsize,
        pub fail: bool,
    }

    impl MemoryClubStore {
        pub fn with_clubs(clubs: impl IntoIterator<Item = Club>) -> Self {
            Self {
                clubs: clubs.into_iter().map(|c| (c.id, c)).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ClubStore for MemoryClubStore {
        async fn find_club(&self, id: Uuid) -> Result<Option<Club>, DatabaseError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DatabaseError::Other("connection reset".to_string()));
            }
            Ok(self.clubs.get(&id).cloned())
        }
    }

    pub fn club(name: &str) -> Club {
        let now = chrono::Utc::now();
        Club {
            id: Uuid::new_v4(),
            slug: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            description: None,
            location: None,
            latitude: None,
            longitude: None,
            website: None,
            instagram: None,
            is_private: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session(caller: Option<Caller>) -> SessionResolver {
        SessionResolver::new(Arc::new(StaticProvider(caller)), HeaderMap::new())
    }

    #[derive(Debug, thiserror::Error)]
    #[error("handler exploded")]
    pub struct Boom;

    #[derive(Debug, Deserialize, Validate)]
    pub struct NoInput {}

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    pub struct ClubInput {
        pub club_id: Uuid,
        #[validate(length(min = 3))]
        #[serde(default = "default_note")]
        pub note: String,
    }

    fn default_note() -> String {
        "note".to_string()
    }

    /// Global action counting how often its body runs
    #[derive(Default)]
    pub struct Touch {
        pub runs: AtomicUsize,
    }

    #[async_trait]
    impl Action for Touch {
        const NAME: &'static str = "test.touch";
        type Scope = Global;
        type Input = NoInput;
        type Output = Uuid;
        type Error = Boom;

        async fn execute(&self, _input: NoInput, ctx: OperationContext<Global>) -> Result<Uuid, Boom> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(ctx.caller().id)
        }
    }

    /// Club-scoped action counting how often its body runs
    #[derive(Default)]
    pub struct TouchClub {
        pub runs: AtomicUsize,
        pub fail: bool,
    }

    #[async_trait]
    impl Action for TouchClub {
        const NAME: &'static str = "test.touch_club";
        type Scope = ClubScoped;
        type Input = ClubInput;
        type Output = Uuid;
        type Error = Boom;

        async fn execute(
            &self,
            _input: ClubInput,
            ctx: OperationContext<ClubScoped>,
        ) -> Result<Uuid, Boom> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Boom);
            }
            Ok(ctx.club().id)
        }
    }

    fn player(elevated: &[Uuid]) -> Caller {
        Caller::new(Uuid::new_v4(), "player@example.com").with_elevated_clubs(elevated.iter().copied())
    }

    fn rejection<E: std::fmt::Debug>(result: Result<Uuid, ActionError<E>>) -> Rejection {
        match result {
            Err(ActionError::Rejected(r)) => r,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_global_action_runs_for_authenticated_caller() {
        let client = ActionClient::new(Arc::new(MemoryClubStore::default()));
        let action = Touch::default();
        let caller = player(&[]);

        let result = client.run(&action, &session(Some(caller.clone())), json!({})).await;

        assert_eq!(result.unwrap(), caller.id);
        assert_eq!(action.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_global_action_rejects_anonymous_caller() {
        let client = ActionClient::new(Arc::new(MemoryClubStore::default()));
        let action = Touch::default();

        let err = rejection(client.run(&action, &session(None), json!({})).await);

        assert_eq!(err, Rejection::Unauthenticated);
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_unauthenticated() {
        let client = ActionClient::new(Arc::new(MemoryClubStore::default()));
        let action = Touch::default();
        let resolver = SessionResolver::new(Arc::new(FailingProvider), HeaderMap::new());

        let err = rejection(client.run(&action, &resolver, json!({})).await);

        assert_eq!(err, Rejection::Unauthenticated);
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_global_action_ignores_club_field() {
        let store = Arc::new(MemoryClubStore::default());
        let client = ActionClient::new(store.clone());
        let action = Touch::default();

        let result = client
            .run(&action, &session(Some(player(&[]))), json!({ "clubId": Uuid::new_v4() }))
            .await;

        assert!(result.is_ok());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_club_is_not_found_regardless_of_privilege() {
        let store = Arc::new(MemoryClubStore::default());
        let client = ActionClient::new(store.clone());
        let action = TouchClub::default();
        let missing = Uuid::new_v4();

        for caller in [
            player(&[]),
            player(&[missing]),
            player(&[]).with_admin(true),
        ] {
            let err = rejection(
                client
                    .run(&action, &session(Some(caller)), json!({ "clubId": missing }))
                    .await,
            );
            assert_eq!(err, Rejection::NotFound("Club".to_string()));
        }
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_global_admin_passes_without_membership() {
        let t1 = club("Forest Rangers");
        let client = ActionClient::new(Arc::new(MemoryClubStore::with_clubs([t1.clone()])));
        let action = TouchClub::default();
        let admin = player(&[]).with_admin(true);

        let result = client.run(&action, &session(Some(admin)), json!({ "clubId": t1.id })).await;

        assert_eq!(result.unwrap(), t1.id);
        assert_eq!(action.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_member_without_elevated_role_is_forbidden() {
        let t1 = club("Forest Rangers");
        let client = ActionClient::new(Arc::new(MemoryClubStore::with_clubs([t1.clone()])));
        let action = TouchClub::default();

        let err = rejection(
            client
                .run(&action, &session(Some(player(&[]))), json!({ "clubId": t1.id }))
                .await,
        );

        assert_eq!(err.code(), "forbidden");
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_elevated_on_other_club_is_forbidden() {
        let t1 = club("Forest Rangers");
        let t2 = club("Urban Wolves");
        let client = ActionClient::new(Arc::new(MemoryClubStore::with_clubs([t1.clone(), t2.clone()])));
        let action = TouchClub::default();
        let caller_a = player(&[t1.id]);

        let err = rejection(
            client
                .run(&action, &session(Some(caller_a.clone())), json!({ "clubId": t2.id }))
                .await,
        );
        assert_eq!(err.code(), "forbidden");

        let result = client
            .run(&action, &session(Some(caller_a)), json!({ "clubId": t1.id }))
            .await;
        assert_eq!(result.unwrap(), t1.id);
        assert_eq!(action.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_anonymous_caller_never_reaches_club_store() {
        let t1 = club("Forest Rangers");
        let store = Arc::new(MemoryClubStore::with_clubs([t1.clone()]));
        let client = ActionClient::new(store.clone());
        let action = TouchClub::default();

        let err = rejection(client.run(&action, &session(None), json!({ "clubId": t1.id })).await);

        assert_eq!(err, Rejection::Unauthenticated);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_club_id_is_invalid_input() {
        let store = Arc::new(MemoryClubStore::default());
        let client = ActionClient::new(store.clone());
        let action = TouchClub::default();
        let caller = player(&[]).with_admin(true);

        for raw in [json!({}), json!({ "clubId": "" }), json!({ "clubId": "T1" })] {
            let err = rejection(client.run(&action, &session(Some(caller.clone())), raw).await);
            assert_eq!(err.code(), "invalid_input");
        }
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_domain_validation_runs_before_handler() {
        let t1 = club("Forest Rangers");
        let client = ActionClient::new(Arc::new(MemoryClubStore::with_clubs([t1.clone()])));
        let action = TouchClub::default();

        let err = rejection(
            client
                .run(
                    &action,
                    &session(Some(player(&[t1.id]))),
                    json!({ "clubId": t1.id, "note": "x" }),
                )
                .await,
        );

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_rejection() {
        let t1 = club("Forest Rangers");
        let store = MemoryClubStore {
            fail: true,
            ..MemoryClubStore::with_clubs([t1.clone()])
        };
        let client = ActionClient::new(Arc::new(store));
        let action = TouchClub::default();

        let err = rejection(
            client
                .run(&action, &session(Some(player(&[t1.id]))), json!({ "clubId": t1.id }))
                .await,
        );

        assert_eq!(err, Rejection::Internal);
        assert!(!err.to_string().contains("connection reset"));
        assert_eq!(action.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        let t1 = club("Forest Rangers");
        let client = ActionClient::new(Arc::new(MemoryClubStore::with_clubs([t1.clone()])));
        let action = TouchClub {
            fail: true,
            ..Default::default()
        };

        let result = client
            .run(&action, &session(Some(player(&[t1.id]))), json!({ "clubId": t1.id }))
            .await;

        assert!(matches!(result, Err(ActionError::Handler(Boom))));
    }

    #[tokio::test]
    async fn test_repeated_invocations_are_idempotent() {
        let t1 = club("Forest Rangers");
        let t2 = club("Urban Wolves");
        let store = Arc::new(MemoryClubStore::with_clubs([t1.clone(), t2.clone()]));
        let client = ActionClient::new(store.clone());
        let action = TouchClub::default();
        let caller = player(&[t1.id]);

        for _ in 0..3 {
            let allowed = client
                .run(&action, &session(Some(caller.clone())), json!({ "clubId": t1.id }))
                .await;
            assert_eq!(allowed.unwrap(), t1.id);

            let denied = rejection(
                client
                    .run(&action, &session(Some(caller.clone())), json!({ "clubId": t2.id }))
                    .await,
            );
            assert_eq!(denied.code(), "forbidden");
        }

        assert_eq!(action.runs.load(Ordering::SeqCst), 3);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 6);
    }
}
