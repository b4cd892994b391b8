use askama::Template;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use crate::config::{ADMIN_ROLE, SESSION_COOKIE};
use crate::console::bridge::{REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
use crate::error::AdminError;
use crate::models::{AdminResponse, AppState, CurrentUser, Store, UserRowView};
use crate::services::persist_store;
use crate::templates::RoleOptionsTemplate;

pub const ADMIN_USERS_PATH: &str = "/admin/users";
pub const LOGIN_PATH: &str = "/auth/login";

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn current_user_id_from_jar(state: &AppState, jar: &CookieJar) -> Option<u64> {
    let sid = session_id_from_jar(jar)?;
    state.session_user(&sid)
}

/// Signed-in user, if the session points at an active account.
pub fn build_current_user(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let id = current_user_id_from_jar(state, jar)?;
    let store = state.store.lock().unwrap();
    let rec = store.user(id).filter(|u| u.is_active)?;
    Some(CurrentUser {
        id: rec.id,
        username: rec.username.clone(),
        email: rec.email.clone(),
        roles: rec.roles.clone(),
        is_admin: rec.has_role(ADMIN_ROLE),
    })
}

pub fn take_flash_messages(state: &AppState, jar: &CookieJar) -> Vec<String> {
    let Some(sid) = session_id_from_jar(jar) else {
        return vec![];
    };
    let mut fs = state.flash_store.lock().unwrap();
    fs.remove(&sid).unwrap_or_default()
}

pub fn push_flash(state: &AppState, jar: &CookieJar, message: impl Into<String>) {
    if let Some(sid) = session_id_from_jar(jar) {
        state
            .flash_store
            .lock()
            .unwrap()
            .entry(sid)
            .or_default()
            .push(message.into());
    }
}

#[derive(Default)]
pub struct TemplateGlobals {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
}

pub fn build_template_globals(state: &AppState, jar: &CookieJar) -> TemplateGlobals {
    let current_user = build_current_user(state, jar);
    let flash_messages = take_flash_messages(state, jar);
    let has_flash_messages = !flash_messages.is_empty();
    TemplateGlobals {
        current_user,
        base_url: state.public_base_url.clone(),
        flash_messages,
        has_flash_messages,
    }
}

pub fn render_template<T: Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// True when the caller expects a partial JSON response: the request was
/// sent by a script or `application/json` is its preferred media type.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let scripted = headers
        .get(REQUESTED_WITH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case(REQUESTED_WITH_VALUE))
        .unwrap_or(false);
    if scripted {
        return true;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .and_then(preferred_media_type)
        .map(|m| m.eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Highest-quality entry of an `Accept` header; ties go to the first one.
fn preferred_media_type(accept: &str) -> Option<&str> {
    let mut best: Option<(&str, f32)> = None;
    for entry in accept.split(',') {
        let mut parts = entry.split(';');
        let media = parts.next().unwrap_or("").trim();
        if media.is_empty() {
            continue;
        }
        let q = parts
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        if q > 0.0 && best.map(|(_, b)| q > b).unwrap_or(true) {
            best = Some((media, q));
        }
    }
    best.map(|(m, _)| m)
}

/// Runs `op` against a copy of the store and swaps the copy in only once
/// the data file has been written.
pub fn mutate_store<T>(
    state: &AppState,
    op: impl FnOnce(&mut Store) -> Result<T, AdminError>,
) -> Result<T, AdminError> {
    let mut store = state.store.lock().unwrap();
    let mut next = store.clone();
    let out = op(&mut next)?;
    if let Err(e) = persist_store(&state.data_file, &next) {
        tracing::error!(%e, path = %state.data_file.display(), "Failed to persist data file");
        return Err(e);
    }
    *store = next;
    Ok(out)
}

/// Answers an admin action: JSON for script callers, otherwise a flash
/// message and a redirect back to the users page.
pub fn admin_reply(
    state: &AppState,
    jar: &CookieJar,
    headers: &HeaderMap,
    result: Result<AdminResponse, AdminError>,
) -> Response {
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Admin action rejected");
    }
    if wants_json(headers) {
        return match result {
            Ok(body) => Json(body).into_response(),
            Err(e) => e.into_response(),
        };
    }
    let message = match result {
        Ok(body) => body.message.unwrap_or_default(),
        Err(e) => e.to_string(),
    };
    if !message.is_empty() {
        push_flash(state, jar, message);
    }
    Redirect::to(ADMIN_USERS_PATH).into_response()
}

pub fn role_options_html(store: &Store) -> String {
    RoleOptionsTemplate { roles: &store.roles }
        .render()
        .unwrap_or_else(|e| {
            tracing::error!(%e, "Template render error");
            String::new()
        })
}

/// Rows for the users table, ordered by id, plus the role `<option>` list.
pub fn build_rows(store: &Store) -> (Vec<UserRowView>, String) {
    let options = role_options_html(store);
    let rows = store
        .users
        .values()
        .map(|u| UserRowView {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            roles_text: u.roles_text(),
            role_options_html: options.clone(),
        })
        .collect();
    (rows, options)
}

/// Login redirect that brings the user back to `path` afterwards.
pub fn login_redirect(path: &str) -> Redirect {
    if path.is_empty() || path == "/" {
        return Redirect::to(LOGIN_PATH);
    }
    Redirect::to(&format!("{}?next={}", LOGIN_PATH, urlencoding::encode(path)))
}

/// Keeps post-login redirects on this site.
pub fn safe_next(next: &str) -> &str {
    let next = next.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\") {
        next
    } else {
        "/"
    }
}
