use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    Success,
    Fail,
}

/// One login attempt, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginLog {
    pub id: u64,
    pub user_id: Option<u64>,
    pub login_time: DateTime<Utc>,
    pub status: LoginStatus,
    pub ip: Option<String>,
    pub ua: Option<String>,
}
