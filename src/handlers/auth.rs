use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Form, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::config::{SESSION_COOKIE, SESSION_MAX_AGE_DAYS};
use crate::models::{AppState, CurrentUser};
use crate::services::{authenticate, persist_store, random_session_id};
use crate::templates::{DashboardTemplate, LoginTemplate};

use super::helpers::{
    build_rows, build_template_globals, current_user_id_from_jar, render_template, safe_next,
    session_id_from_jar, TemplateGlobals, LOGIN_PATH,
};

#[derive(Deserialize, Default)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

fn login_page(state: &AppState, jar: &CookieJar, error: Option<String>, next: String) -> Response {
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(state, jar);
    render_template(LoginTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        error,
        next,
    })
}

pub async fn login_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if current_user_id_from_jar(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    login_page(&state, &jar, None, query.next.unwrap_or_default())
}

pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let ip = connect.map(|ConnectInfo(addr)| addr.ip().to_string());
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let user = {
        let mut store = state.store.lock().unwrap();
        let user = authenticate(&mut store, &form.username, &form.password, ip, ua);
        // The attempt is logged either way.
        if let Err(e) = persist_store(&state.data_file, &store) {
            tracing::error!(%e, "Failed to persist login log");
        }
        user
    };

    let Some(user) = user else {
        return login_page(&state, &jar, Some("Invalid credentials".into()), form.next);
    };

    let pruned = state.prune_sessions();
    if pruned > 0 {
        tracing::debug!(pruned, "Dropped expired sessions");
    }
    let sid = random_session_id();
    state.open_session(sid.clone(), user.id);
    tracing::info!(id = user.id, username = %user.username, "User signed in");

    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(SESSION_MAX_AGE_DAYS));
    let target = safe_next(&form.next).to_string();
    (jar.add(cookie), Redirect::to(&target)).into_response()
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(sid) = session_id_from_jar(&jar) {
        state.close_session(&sid);
    }
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Redirect::to(LOGIN_PATH))
}

/// Dashboard. Administrators also get the users table.
pub async fn root_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let show_users = user.is_admin;
    let (rows, role_options_html) = if show_users {
        build_rows(&state.store.lock().unwrap())
    } else {
        (Vec::new(), String::new())
    };
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(DashboardTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        show_users,
        rows,
        role_options_html,
    })
}
