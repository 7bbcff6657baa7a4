use crate::caller::Caller;
use crate::provider::SessionProvider;
use axum::http::HeaderMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Request-scoped caller lookup.
///
/// The provider is consulted at most once per resolver; every later call
/// returns the memoised result. Provider failures are logged and resolve to
/// "no caller". Nothing is retried.
pub struct SessionResolver {
    provider: Arc<dyn SessionProvider>,
    headers: HeaderMap,
    caller: OnceCell<Option<Caller>>,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn SessionProvider>, headers: HeaderMap) -> Self {
        Self {
            provider,
            headers,
            caller: OnceCell::new(),
        }
    }

    pub async fn resolve(&self) -> Option<&Caller> {
        if let Some(cached) = self.caller.get() {
            tracing::debug!("Session cache hit");
            return cached.as_ref();
        }

        self.caller
            .get_or_init(|| async {
                match self.provider.fetch_caller(&self.headers).await {
                    Ok(caller) => caller,
                    Err(e) => {
                        tracing::warn!("Session lookup failed, treating request as anonymous: {}", e);
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct CountingProvider {
        caller: Option<Caller>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionProvider for CountingProvider {
        async fn fetch_caller(&self, _headers: &HeaderMap) -> Result<Option<Caller>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::Provider("upstream unavailable".to_string()));
            }
            Ok(self.caller.clone())
        }
    }

    fn provider(caller: Option<Caller>, fail: bool) -> Arc<CountingProvider> {
        Arc::new(CountingProvider {
            caller,
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_resolve_is_memoised() {
        let caller = Caller::new(Uuid::new_v4(), "player@example.com");
        let provider = provider(Some(caller.clone()), false);
        let resolver = SessionResolver::new(provider.clone(), HeaderMap::new());

        assert_eq!(resolver.resolve().await, Some(&caller));
        assert_eq!(resolver.resolve().await, Some(&caller));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_caller_is_memoised() {
        let provider = provider(None, false);
        let resolver = SessionResolver::new(provider.clone(), HeaderMap::new());

        assert!(resolver.resolve().await.is_none());
        assert!(resolver.resolve().await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_error_means_no_caller() {
        let provider = provider(None, true);
        let resolver = SessionResolver::new(provider.clone(), HeaderMap::new());

        assert!(resolver.resolve().await.is_none());
        assert!(resolver.resolve().await.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolvers_do_not_share_state() {
        let caller = Caller::new(Uuid::new_v4(), "player@example.com");
        let provider = provider(Some(caller), false);

        for _ in 0..3 {
            let resolver = SessionResolver::new(provider.clone(), HeaderMap::new());
            assert!(resolver.resolve().await.is_some());
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}
