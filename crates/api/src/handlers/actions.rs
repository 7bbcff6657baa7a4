use crate::handlers::ErrorResponse;
use crate::AppState;
use airsoft_actions::{ActionDescriptor, ActionFailure, DomainError, Rejection};
use airsoft_auth::SessionResolver;
use airsoft_models::resolve_locale;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// List registered actions with their scope
/// GET /api/actions
pub async fn list_actions(State(state): State<Arc<AppState>>) -> Json<Vec<ActionDescriptor>> {
    Json(state.registry.descriptors())
}

/// Run an action through the authorization middleware
/// POST /api/actions/:name
///
/// The caller is resolved before the body is looked at, so an anonymous
/// request is always answered with `unauthenticated`.
pub async fn invoke_action(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // One resolver per request; the caller is looked up at most once
    let session = SessionResolver::new(state.sessions.clone(), headers);
    let caller = session.resolve().await;
    let locale = resolve_locale(
        caller.and_then(|c| c.locale.as_deref()),
        accept_language.as_deref(),
    );

    let result = match (caller, body) {
        (None, _) => Err(ActionFailure::Rejected(Rejection::Unauthenticated)),
        (Some(_), Err(rejection)) => Err(ActionFailure::Rejected(Rejection::InvalidInput(
            rejection.body_text(),
        ))),
        (Some(_), Ok(Json(raw))) => state.registry.dispatch(&name, &session, raw).await,
    };

    let mut response = match result {
        Ok(output) => Json(output).into_response(),
        Err(failure) => failure_response(&name, &failure).into_response(),
    };
    response
        .headers_mut()
        .insert(CONTENT_LANGUAGE, HeaderValue::from_static(locale));
    response
}

fn status_for(failure: &ActionFailure) -> StatusCode {
    match failure {
        ActionFailure::UnknownAction(_) => StatusCode::NOT_FOUND,
        ActionFailure::Rejected(rejection) => match rejection {
            Rejection::Unauthenticated => StatusCode::UNAUTHORIZED,
            Rejection::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Rejection::NotFound(_) => StatusCode::NOT_FOUND,
            Rejection::Forbidden(_) => StatusCode::FORBIDDEN,
            Rejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ActionFailure::Domain(err) => match err {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Database(_) | DomainError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

pub fn failure_response(action: &str, failure: &ActionFailure) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_for(failure);
    let code = match failure {
        ActionFailure::UnknownAction(_) => "unknown_action",
        ActionFailure::Rejected(rejection) => rejection.code(),
        ActionFailure::Domain(err) => err.code(),
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Action {} failed: {}", action, failure);
        return (
            status,
            Json(ErrorResponse::new(code, "An internal error occurred")),
        );
    }

    (status, Json(ErrorResponse::new(code, &failure.to_string())))
}
