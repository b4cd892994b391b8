use axum::{
    extract::{Form, Path, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::models::{AdminResponse, AppState, CurrentUser};
use crate::services::{create_user, delete_user, grant_role, reset_password, revoke_role};
use crate::templates::AdminUsersTemplate;

use super::helpers::{admin_reply, build_rows, build_template_globals, mutate_store, render_template, TemplateGlobals};

#[derive(Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RoleForm {
    #[serde(default)]
    pub role: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub new_password: String,
}

pub async fn users_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (rows, role_options_html) = build_rows(&state.store.lock().unwrap());
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(AdminUsersTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        rows,
        role_options_html,
    })
}

pub async fn users_create(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Form(form): Form<CreateUserForm>,
) -> Response {
    let result = mutate_store(&state, |store| {
        create_user(store, &form.username, &form.email, &form.password)
    })
    .map(|created| AdminResponse {
        ok: true,
        message: Some("User created".into()),
        id: Some(created.id),
        username: Some(created.username),
        email: Some(created.email),
        roles: Some(created.roles),
    });
    admin_reply(&state, &jar, &headers, result)
}

pub async fn grant(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Form(form): Form<RoleForm>,
) -> Response {
    let result = mutate_store(&state, |store| grant_role(store, id, form.role.trim()))
        .map(|user| AdminResponse::success("Role granted").with_id(id).with_roles(user.roles));
    admin_reply(&state, &jar, &headers, result)
}

pub async fn revoke(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<u64>,
    Form(form): Form<RoleForm>,
) -> Response {
    let result = mutate_store(&state, |store| revoke_role(store, Some(actor.id), id, form.role.trim()))
        .map(|user| AdminResponse::success("Role revoked").with_id(id).with_roles(user.roles));
    admin_reply(&state, &jar, &headers, result)
}

pub async fn reset(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let result = mutate_store(&state, |store| reset_password(store, id, &form.new_password))
        .map(|_| AdminResponse::success("Password reset").with_id(id));
    admin_reply(&state, &jar, &headers, result)
}

pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<u64>,
) -> Response {
    let result = mutate_store(&state, |store| delete_user(store, Some(actor.id), id))
        .map(|_| AdminResponse::success("User deleted").with_id(id));
    admin_reply(&state, &jar, &headers, result)
}
