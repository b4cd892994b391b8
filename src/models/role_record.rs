use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
}

impl RoleRecord {
    pub fn new(name: &str, desc: &str) -> Self {
        RoleRecord {
            name: name.to_string(),
            desc: Some(desc.to_string()),
        }
    }
}
