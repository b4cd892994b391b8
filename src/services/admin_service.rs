//! User and role operations on the in-memory store.
//!
//! Nothing here touches the data file or knows about HTTP; callers persist
//! the store after a successful operation and turn errors into responses.

use chrono::Utc;

use crate::config::{ADMIN_ROLE, DEFAULT_INITIAL_PASSWORD, MAX_EMAIL_LEN, MAX_USERNAME_LEN, USER_ROLE};
use crate::error::AdminError;
use crate::models::{LoginLog, LoginStatus, RoleRecord, Store, UserRecord};

use super::user_service::{generate_password_hash, verify_password};

const LAST_ADMIN: &str = "At least one administrator must remain";

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

fn user_mut<'a>(store: &'a mut Store, id: u64) -> Result<&'a mut UserRecord, AdminError> {
    store
        .users
        .get_mut(&id)
        .ok_or_else(|| AdminError::NotFound("User not found".into()))
}

fn require_role(store: &Store, role: &str) -> Result<(), AdminError> {
    if role.trim().is_empty() {
        return Err(AdminError::Validation("Role is required".into()));
    }
    if store.role(role).is_none() {
        return Err(AdminError::NotFound(format!("Role {} not found", role)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AdminError> {
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AdminError::Validation(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LEN
        )));
    }
    Ok(())
}

pub fn create_user(
    store: &mut Store,
    username: &str,
    email: &str,
    password: &str,
) -> Result<CreatedUser, AdminError> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AdminError::Validation("Username and email are required".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AdminError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    validate_email(email)?;
    if store.users.values().any(|u| u.username == username || u.email == email) {
        return Err(AdminError::Conflict("Username or email already exists".into()));
    }

    let password = match password.trim() {
        "" => DEFAULT_INITIAL_PASSWORD,
        p => p,
    };
    let roles = if store.role(USER_ROLE).is_some() {
        vec![USER_ROLE.to_string()]
    } else {
        vec![]
    };
    let id = store.allocate_user_id();
    store.users.insert(
        id,
        UserRecord {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: generate_password_hash(password),
            roles: roles.clone(),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        },
    );
    tracing::info!(id, username, "User created");
    Ok(CreatedUser {
        id,
        username: username.to_string(),
        email: email.to_string(),
        roles,
    })
}

/// Grants `role`. Granting a role the user already holds succeeds without
/// changing anything.
pub fn grant_role(store: &mut Store, id: u64, role: &str) -> Result<UserRecord, AdminError> {
    store
        .user(id)
        .ok_or_else(|| AdminError::NotFound("User not found".into()))?;
    require_role(store, role)?;
    let user = user_mut(store, id)?;
    if !user.has_role(role) {
        user.roles.push(role.to_string());
        tracing::info!(id, role, "Role granted");
    }
    Ok(user.clone())
}

/// Revokes `role`. `actor` is the signed-in administrator, if any; nobody
/// may revoke their own roles and the last administrator keeps `admin`.
pub fn revoke_role(
    store: &mut Store,
    actor: Option<u64>,
    id: u64,
    role: &str,
) -> Result<UserRecord, AdminError> {
    let target = store
        .user(id)
        .ok_or_else(|| AdminError::NotFound("User or role not found".into()))?;
    if store.role(role).is_none() {
        return Err(AdminError::NotFound("User or role not found".into()));
    }
    if actor == Some(id) {
        return Err(AdminError::Validation("You cannot revoke your own roles".into()));
    }
    if role == ADMIN_ROLE && target.has_role(ADMIN_ROLE) && store.count_with_role(ADMIN_ROLE) <= 1 {
        return Err(AdminError::Validation(LAST_ADMIN.into()));
    }
    let user = user_mut(store, id)?;
    user.roles.retain(|r| r != role);
    tracing::info!(id, role, "Role revoked");
    Ok(user.clone())
}

/// Deletes a user together with their login history.
pub fn delete_user(store: &mut Store, actor: Option<u64>, id: u64) -> Result<UserRecord, AdminError> {
    let target = store
        .user(id)
        .ok_or_else(|| AdminError::NotFound("User not found".into()))?;
    if actor == Some(id) {
        return Err(AdminError::Validation("You cannot delete yourself".into()));
    }
    if target.has_role(ADMIN_ROLE) && store.count_with_role(ADMIN_ROLE) <= 1 {
        return Err(AdminError::Validation(LAST_ADMIN.into()));
    }
    store.login_logs.retain(|log| log.user_id != Some(id));
    let removed = store
        .users
        .remove(&id)
        .ok_or_else(|| AdminError::NotFound("User not found".into()))?;
    tracing::info!(id, username = %removed.username, "User deleted");
    Ok(removed)
}

pub fn reset_password(store: &mut Store, id: u64, new_password: &str) -> Result<UserRecord, AdminError> {
    let user = user_mut(store, id)?;
    let new_password = new_password.trim();
    if new_password.is_empty() {
        return Err(AdminError::Validation("New password cannot be empty".into()));
    }
    user.password = generate_password_hash(new_password);
    tracing::info!(id, "Password reset");
    Ok(user.clone())
}

/// Checks credentials and records the attempt in the login log.
pub fn authenticate(
    store: &mut Store,
    username: &str,
    password: &str,
    ip: Option<String>,
    ua: Option<String>,
) -> Option<UserRecord> {
    let found = store.user_by_name(username.trim()).map(|u| u.id);
    let ok = found
        .and_then(|id| store.user(id))
        .map(|u| u.is_active && verify_password(&u.password, password))
        .unwrap_or(false);
    let log_id = store.allocate_log_id();
    let now = Utc::now();
    store.login_logs.push(LoginLog {
        id: log_id,
        user_id: found,
        login_time: now,
        status: if ok { LoginStatus::Success } else { LoginStatus::Fail },
        ip,
        ua,
    });
    if !ok {
        tracing::warn!(username, "Failed login attempt");
        return None;
    }
    let user = store.users.get_mut(&found?)?;
    user.last_login_at = Some(now);
    Some(user.clone())
}

pub fn update_email(store: &mut Store, id: u64, email: &str) -> Result<UserRecord, AdminError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AdminError::Validation("Email is required".into()));
    }
    validate_email(email)?;
    if store.users.values().any(|u| u.id != id && u.email == email) {
        return Err(AdminError::Conflict("Email already in use".into()));
    }
    let user = user_mut(store, id)?;
    user.email = email.to_string();
    Ok(user.clone())
}

pub fn change_password(store: &mut Store, id: u64, old: &str, new: &str) -> Result<(), AdminError> {
    let user = user_mut(store, id)?;
    if !verify_password(&user.password, old) {
        return Err(AdminError::Validation("Current password is incorrect".into()));
    }
    if new.trim().is_empty() {
        return Err(AdminError::Validation("New password cannot be empty".into()));
    }
    user.password = generate_password_hash(new.trim());
    Ok(())
}

/// Adds a role that users can then be granted.
pub fn add_role(store: &mut Store, name: &str, desc: Option<&str>) -> Result<RoleRecord, AdminError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::Validation("Role is required".into()));
    }
    if store.role(name).is_some() {
        return Err(AdminError::Conflict(format!("Role {} already exists", name)));
    }
    let role = RoleRecord {
        name: name.to_string(),
        desc: desc.map(str::trim).filter(|d| !d.is_empty()).map(str::to_string),
    };
    store.roles.push(role.clone());
    tracing::info!(role = name, "Role added");
    Ok(role)
}
