use askama::Template;

use crate::models::{RoleRecord, UserRowView};

/// One `tr[data-uid]` row of the users table.
#[derive(Template)]
#[template(path = "partials/user_row.html")]
pub struct UserRowTemplate<'a> {
    pub row: &'a UserRowView,
    /// Prefix for the form actions, empty when served from the root.
    pub base_url: &'a str,
}

/// `<option>` list for the grant and revoke selectors.
#[derive(Template)]
#[template(path = "partials/role_options.html")]
pub struct RoleOptionsTemplate<'a> {
    pub roles: &'a [RoleRecord],
}
