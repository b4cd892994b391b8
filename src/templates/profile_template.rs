use askama::Template;
use crate::models::{CurrentUser, UserRecord};

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub profile: UserRecord,
    pub last_login: String,
}
