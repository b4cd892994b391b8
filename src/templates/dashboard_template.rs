use askama::Template;
use crate::models::{CurrentUser, UserRowView};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    /// Only administrators see the users table.
    pub show_users: bool,
    pub rows: Vec<UserRowView>,
    pub role_options_html: String,
}
