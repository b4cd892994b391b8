use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AdminError;
use crate::handlers::helpers::{build_current_user, login_redirect, wants_json};
use crate::models::AppState;

fn original_path(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default()
}

/// Lets signed-in users through and makes them available as
/// `Extension<CurrentUser>`.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match build_current_user(&state, &jar) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None if wants_json(request.headers()) => AdminError::Unauthenticated.into_response(),
        None => login_redirect(&original_path(&request)).into_response(),
    }
}

/// Like [`require_login`], but the user must also hold the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let json = wants_json(request.headers());
    let Some(user) = build_current_user(&state, &jar) else {
        if json {
            return AdminError::Unauthenticated.into_response();
        }
        return login_redirect(&original_path(&request)).into_response();
    };
    if !user.is_admin {
        tracing::warn!(username = %user.username, path = %request.uri().path(), "Admin access denied");
        if json {
            return AdminError::Forbidden("Administrator role required".into()).into_response();
        }
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }
    request.extensions_mut().insert(user);
    next.run(request).await
}
