use crate::caller::Caller;
use crate::error::Result;
use crate::token::hash_token;
use airsoft_database::{Database, DatabaseError, MembershipRepository, SessionRepository, UserRepository};
use async_trait::async_trait;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

pub const DEFAULT_SESSION_COOKIE: &str = "airsoft_session";

/// Source of caller identity for inbound requests.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the caller behind the request headers, `None` when there is
    /// no valid session.
    async fn fetch_caller(&self, headers: &HeaderMap) -> Result<Option<Caller>>;
}

/// Extract the raw session token from the session cookie, falling back to a
/// `Bearer` Authorization header.
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .map(|pair| pair.trim())
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string());

    if from_cookie.is_some() {
        return from_cookie;
    }

    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Session provider backed by the `sessions`, `users` and `club_members` tables.
#[derive(Clone)]
pub struct DatabaseSessionProvider {
    sessions: SessionRepository,
    users: UserRepository,
    memberships: MembershipRepository,
    cookie_name: String,
}

impl DatabaseSessionProvider {
    pub fn new(db: &Database, cookie_name: impl Into<String>) -> Self {
        let pool = db.pool().clone();
        Self {
            sessions: SessionRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            memberships: MembershipRepository::new(pool),
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for DatabaseSessionProvider {
    async fn fetch_caller(&self, headers: &HeaderMap) -> Result<Option<Caller>> {
        let Some(token) = extract_session_token(headers, &self.cookie_name) else {
            return Ok(None);
        };

        let Some(session) = self.sessions.find_active_by_token_hash(&hash_token(&token)).await? else {
            tracing::debug!("No active session for presented token");
            return Ok(None);
        };

        let user = match self.users.find_by_id(session.user_id).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let elevated = self.memberships.elevated_club_ids(user.id).await?;

        Ok(Some(
            Caller::new(user.id, user.email)
                .with_admin(user.is_admin)
                .with_locale(user.locale)
                .with_elevated_clubs(elevated),
        ))
    }
}
