use std::io::Write;
use std::path::Path;

use chrono::Utc;

use crate::config::{ADMIN_ROLE, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, USER_ROLE};
use crate::error::AdminError;
use crate::models::{RoleRecord, Store, UserRecord};

use super::user_service::generate_password_hash;

/// Loads the data file, creating or repairing it so that the seeded roles
/// and the default administrator always exist.
pub fn load_store(path: &Path) -> Result<Store, AdminError> {
    let (mut store, existed) = if path.exists() {
        let text = std::fs::read_to_string(path)?;
        (serde_json::from_str::<Store>(&text)?, true)
    } else {
        tracing::info!(path = %path.display(), "Data file missing, initialising");
        (Store::default(), false)
    };
    let changed = seed_defaults(&mut store);
    if changed || !existed {
        persist_store(path, &store)?;
    }
    Ok(store)
}

/// Ensures the `admin` and `user` roles and a user named `admin` exist.
/// Returns whether anything was added.
pub fn seed_defaults(store: &mut Store) -> bool {
    let mut changed = false;
    if store.role(ADMIN_ROLE).is_none() {
        store.roles.push(RoleRecord::new(ADMIN_ROLE, "Administrator"));
        changed = true;
    }
    if store.role(USER_ROLE).is_none() {
        store.roles.push(RoleRecord::new(USER_ROLE, "Regular user"));
        changed = true;
    }
    if store.user_by_name(DEFAULT_ADMIN_USERNAME).is_none() {
        let id = store.allocate_user_id();
        store.users.insert(
            id,
            UserRecord {
                id,
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                password: generate_password_hash(DEFAULT_ADMIN_PASSWORD),
                roles: vec![ADMIN_ROLE.to_string()],
                is_active: true,
                created_at: Utc::now(),
                last_login_at: None,
            },
        );
        tracing::warn!(
            username = DEFAULT_ADMIN_USERNAME,
            "Seeded default administrator; change its password"
        );
        changed = true;
    }
    changed
}

/// Writes the store through a temp file in the same directory, so a crash
/// never leaves a truncated data file behind.
pub fn persist_store(path: &Path, store: &Store) -> Result<(), AdminError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let body = serde_json::to_string_pretty(store)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.persist(path).map_err(|e| AdminError::Storage(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::verify_password;

    #[test]
    fn missing_file_is_created_with_seed_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        let store = load_store(&path).unwrap();

        assert!(path.exists());
        assert!(store.role(ADMIN_ROLE).is_some());
        assert!(store.role(USER_ROLE).is_some());
        let admin = store.user_by_name("admin").unwrap();
        assert_eq!(admin.email, "admin@local");
        assert_eq!(admin.roles, vec!["admin".to_string()]);
        assert!(verify_password(&admin.password, DEFAULT_ADMIN_PASSWORD));
    }

    #[test]
    fn existing_file_is_repaired_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        let mut store = Store::default();
        store.roles.push(RoleRecord::new("auditor", "Read-only"));
        persist_store(&path, &store).unwrap();

        let loaded = load_store(&path).unwrap();
        let names: Vec<_> = loaded.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["auditor", "admin", "user"]);
        assert!(loaded.user_by_name("admin").is_some());

        let reread: Store = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread.roles.len(), 3);
    }

    #[test]
    fn seeding_twice_changes_nothing() {
        let mut store = Store::default();
        assert!(seed_defaults(&mut store));
        assert!(!seed_defaults(&mut store));
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_store(&path), Err(AdminError::Storage(_))));
    }
}
