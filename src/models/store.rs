use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{LoginLog, RoleRecord, UserRecord};

/// Everything persisted in the data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default = "first_id")]
    pub next_user_id: u64,
    #[serde(default = "first_id")]
    pub next_log_id: u64,
    #[serde(default)]
    pub users: BTreeMap<u64, UserRecord>,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(default)]
    pub login_logs: Vec<LoginLog>,
}

fn first_id() -> u64 {
    1
}

impl Store {
    pub fn user(&self, id: u64) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn user_by_name(&self, username: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn role(&self, name: &str) -> Option<&RoleRecord> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn count_with_role(&self, name: &str) -> usize {
        self.users.values().filter(|u| u.has_role(name)).count()
    }

    /// Hands out the next user id. Ids are never reused.
    pub fn allocate_user_id(&mut self) -> u64 {
        let floor = self.users.keys().next_back().map(|id| id + 1).unwrap_or(1);
        let id = self.next_user_id.max(floor);
        self.next_user_id = id + 1;
        id
    }

    pub fn allocate_log_id(&mut self) -> u64 {
        let id = self.next_log_id.max(1);
        self.next_log_id = id + 1;
        id
    }
}
