use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::models::{AppState, CurrentUser};
use crate::services::{change_password, update_email};
use crate::templates::ProfileTemplate;

use super::helpers::{build_template_globals, login_redirect, mutate_store, push_flash, render_template, TemplateGlobals};

const PROFILE_PATH: &str = "/me";

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn profile_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    let Some(profile) = state.store.lock().unwrap().user(user.id).cloned() else {
        return login_redirect(PROFILE_PATH).into_response();
    };
    let last_login = profile
        .last_login_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Never".into());
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(ProfileTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        profile,
        last_login,
    })
}

pub async fn profile_update(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<EmailForm>,
) -> Response {
    let message = match mutate_store(&state, |store| update_email(store, user.id, &form.email)) {
        Ok(_) => "Profile updated".to_string(),
        Err(e) => e.to_string(),
    };
    push_flash(&state, &jar, message);
    Redirect::to(PROFILE_PATH).into_response()
}

pub async fn profile_change_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let result = mutate_store(&state, |store| {
        change_password(store, user.id, &form.old_password, &form.new_password)
    });
    let message = match result {
        Ok(()) => {
            tracing::info!(id = user.id, "Password changed");
            "Password changed".to_string()
        }
        Err(e) => e.to_string(),
    };
    push_flash(&state, &jar, message);
    Redirect::to(PROFILE_PATH).into_response()
}
