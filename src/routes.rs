use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, middleware, profile};
use crate::models::AppState;

// Embed the default stylesheet in the binary
pub const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

/// Directory served under `/static`; the console bundle lives in `pkg/`.
pub const STATIC_DIR: &str = "static";

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::users_page).post(admin::users_create))
        .route("/admin/users/create", post(admin::users_create))
        .route("/admin/users/:id/grant", post(admin::grant))
        .route("/admin/users/:id/revoke", post(admin::revoke))
        .route("/admin/users/:id/reset-password", post(admin::reset))
        .route("/admin/users/:id/delete", post(admin::delete))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), middleware::require_admin));

    let member_routes = Router::new()
        .route("/", get(auth::root_get))
        .route("/me", get(profile::profile_get))
        .route("/me/update", post(profile::profile_update))
        .route("/me/change-password", post(profile::profile_change_password))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), middleware::require_login));

    // Always serve styles.css - use custom if provided, otherwise use embedded default
    let stylesheet_content = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

    Router::new()
        .route("/auth/login", get(auth::login_get).post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
        .route(
            "/static/styles.css",
            get(move || {
                let css = stylesheet_content.clone();
                async move { ([(CONTENT_TYPE, "text/css")], css) }
            }),
        )
        .merge(admin_routes)
        .merge(member_routes)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=3600"),
                ))
                .service(ServeDir::new(STATIC_DIR)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
