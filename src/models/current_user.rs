use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub is_admin: bool,
}
