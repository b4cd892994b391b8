use askama::Template;
use crate::models::{CurrentUser, UserRowView};

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub rows: Vec<UserRowView>,
    pub role_options_html: String,
}
